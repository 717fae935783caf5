use crate::types::{file_name_of, AuditError, AuditResult};
use std::path::{Path, PathBuf};

/// Output tree mirroring the relative layout of an input tree
#[derive(Debug, Clone)]
pub struct OutputTree {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl OutputTree {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input_root: P, output_root: Q) -> Self {
        Self {
            input_root: input_root.as_ref().to_path_buf(),
            output_root: output_root.as_ref().to_path_buf(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Where the clipped counterpart of `input` lives
    pub fn target_for(&self, input: &Path) -> AuditResult<PathBuf> {
        let relative = input.strip_prefix(&self.input_root).map_err(|_| {
            AuditError::Processing(format!(
                "{} is not under input root {}",
                input.display(),
                self.input_root.display()
            ))
        })?;
        Ok(self.output_root.join(relative))
    }

    /// Existing targets are completed work from an earlier run
    pub fn is_done(&self, target: &Path) -> bool {
        target.exists()
    }

    /// Produce `target` through `write`, which receives a temporary sibling path.
    ///
    /// Parent folders are created as needed. The temporary file is renamed onto
    /// the target only after `write` succeeds, and removed if it fails.
    pub fn commit<F>(&self, target: &Path, write: F) -> AuditResult<()>
    where
        F: FnOnce(&Path) -> AuditResult<()>,
    {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let partial = partial_path(target);
        if partial.exists() {
            log::debug!("Removing stale partial output: {}", partial.display());
            std::fs::remove_file(&partial)?;
        }

        if let Err(e) = write(&partial) {
            if partial.exists() {
                let _ = std::fs::remove_file(&partial);
            }
            return Err(e);
        }

        std::fs::rename(&partial, target)?;
        Ok(())
    }
}

/// Hidden sibling used while a file is being written
pub fn partial_path(target: &Path) -> PathBuf {
    let name = format!(".{}.partial", file_name_of(target));
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_target_mirrors_relative_path() {
        let tree = OutputTree::new("/data/raw", "/data/clipped");
        let target = tree
            .target_for(Path::new("/data/raw/5 CHELSA/pr/2001/pr_2001.tif"))
            .unwrap();
        assert_eq!(target, PathBuf::from("/data/clipped/5 CHELSA/pr/2001/pr_2001.tif"));

        assert!(tree.target_for(Path::new("/elsewhere/x.tif")).is_err());
    }

    #[test]
    fn test_commit_creates_parents_and_renames() {
        let tmp = TempDir::new().unwrap();
        let tree = OutputTree::new(tmp.path().join("raw"), tmp.path().join("out"));
        let target = tmp.path().join("out/a/b/x.tif");

        tree.commit(&target, |partial| {
            assert_eq!(partial.file_name().unwrap(), ".x.tif.partial");
            fs::write(partial, b"pixels")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"pixels");
        assert!(!partial_path(&target).exists());
        assert!(tree.is_done(&target));
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let tree = OutputTree::new(tmp.path().join("raw"), tmp.path().join("out"));
        let target = tmp.path().join("out/x.tif");

        let result = tree.commit(&target, |partial| {
            fs::write(partial, b"half")?;
            Err(AuditError::Processing("disk full".to_string()))
        });

        assert!(result.is_err());
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
        assert!(!tree.is_done(&target));
    }
}
