use crate::config::ClipConfig;
use crate::core::clip::{clip_raster, ClipOutcome};
use crate::core::reprojection_cache::{BoundaryReprojector, ReprojectionCache};
use crate::io::boundary::Boundary;
use crate::io::raster::write_raster;
use crate::io::walker::CorpusWalker;
use crate::io::writer::OutputTree;
use crate::types::{AuditError, AuditResult};
use gdal::vector::Geometry;
use serde::Serialize;

/// What happened to every raster of a clipping run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClipSummary {
    pub written: usize,
    pub skipped_existing: usize,
    pub skipped_missing_crs: usize,
    pub failed: usize,
    /// Distinct CRSs the boundary was reprojected into
    pub reprojections: usize,
}

impl ClipSummary {
    pub fn processed(&self) -> usize {
        self.written + self.skipped_existing + self.skipped_missing_crs + self.failed
    }
}

/// Clip every raster found by `walker` into `tree`, sequentially, in walk order.
///
/// Per-raster problems are logged and counted; only the caller's boundary
/// loading can abort a run.
pub fn clip_corpus<R>(
    walker: &CorpusWalker,
    tree: &OutputTree,
    cache: &mut ReprojectionCache<R>,
) -> ClipSummary
where
    R: BoundaryReprojector<Geometry = Geometry>,
{
    let mut summary = ClipSummary::default();

    for folder in walker.folders() {
        if folder.path.starts_with(tree.output_root()) {
            log::debug!("Not descending into output tree: {}", folder.path.display());
            continue;
        }

        for input in folder.file_paths() {
            let target = match tree.target_for(&input) {
                Ok(target) => target,
                Err(e) => {
                    log::warn!("{}", e);
                    summary.failed += 1;
                    continue;
                }
            };

            if tree.is_done(&target) {
                log::info!("[SKIP] Already exists: {}", target.display());
                summary.skipped_existing += 1;
                continue;
            }

            log::info!("[CLIP] {}", input.display());
            match clip_raster(&input, cache) {
                Ok(ClipOutcome::MissingCrs) => {
                    log::warn!("Skipping (no CRS identified): {}", input.display());
                    summary.skipped_missing_crs += 1;
                }
                Ok(ClipOutcome::Clipped(clipped)) => {
                    let written = tree.commit(&target, |partial| {
                        write_raster(partial, &clipped.profile, &clipped.data)
                    });
                    match written {
                        Ok(()) => {
                            log::info!("Saved clipped raster to: {}", target.display());
                            summary.written += 1;
                        }
                        Err(e) => {
                            log::warn!("Could not write {}: {}", target.display(), e);
                            summary.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Could not clip raster {}: {}", input.display(), e);
                    summary.failed += 1;
                }
            }
        }
    }

    summary.reprojections = cache.len();
    summary
}

/// Load the boundary and clip the configured corpus into the output tree.
///
/// A boundary without a CRS aborts before any raster is touched.
pub fn run_clipping(config: &ClipConfig) -> AuditResult<ClipSummary> {
    config.validate()?;
    if !config.input_root.is_dir() {
        return Err(AuditError::Config(format!(
            "input root is not a directory: {}",
            config.input_root.display()
        )));
    }

    let boundary = Boundary::load(&config.boundary_path)?;
    let mut cache = ReprojectionCache::new(boundary);
    let walker = CorpusWalker::new(&config.input_root, &config.extensions);
    let tree = OutputTree::new(&config.input_root, &config.output_root);

    let summary = clip_corpus(&walker, &tree, &mut cache);

    log::info!(
        "Clipping done: {} written, {} already present, {} without CRS, {} failed, {} reprojection(s)",
        summary.written,
        summary.skipped_existing,
        summary.skipped_missing_crs,
        summary.failed,
        summary.reprojections
    );
    log::info!("Clipped rasters are under: {}", config.output_root.display());
    Ok(summary)
}
