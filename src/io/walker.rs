use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A folder holding at least one raster, with raster file names in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFolder {
    pub path: PathBuf,
    pub files: Vec<String>,
}

impl RasterFolder {
    pub fn file_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(move |f| self.path.join(f))
    }
}

/// Deterministic depth-first enumeration of raster folders.
///
/// Directories are visited pre-order with siblings sorted by file name, and the
/// raster files of each folder are sorted the same way, so two walks over an
/// unchanged tree always agree. Symlinked files are listed, symlinked
/// directories are not descended into.
#[derive(Debug, Clone)]
pub struct CorpusWalker {
    root: PathBuf,
    extensions: Vec<String>,
}

impl CorpusWalker {
    pub fn new<P: AsRef<Path>>(root: P, extensions: &[String]) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_raster_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Lazily walk the corpus. Calling this again restarts from the root.
    pub fn folders(&self) -> impl Iterator<Item = RasterFolder> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry during walk: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(move |entry| self.scan_folder(entry.path()))
    }

    fn scan_folder(&self, dir: &Path) -> Option<RasterFolder> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Could not list folder {}: {}", dir.display(), e);
                return None;
            }
        };

        let mut files: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| self.is_raster_name(name))
            .collect();

        if files.is_empty() {
            return None;
        }
        files.sort();

        log::debug!("Found {} rasters in {}", files.len(), dir.display());
        Some(RasterFolder {
            path: dir.to_path_buf(),
            files,
        })
    }
}
