//! Corpus auditing and clipping

pub mod classify;
pub mod clip;
pub mod clip_run;
pub mod grouping;
pub mod inspect;
pub mod report;
pub mod reprojection_cache;

pub use classify::{classify_meters, describe_resolution};
pub use clip::{clip_raster, ClipOutcome, ClippedRaster};
pub use clip_run::{clip_corpus, run_clipping, ClipSummary};
pub use grouping::{group_records, CrsGroup, FolderGroups, ResolutionGroup};
pub use inspect::{inspect_corpus, inspect_folder, run_inspection};
pub use report::{render_report, write_report, FolderReport};
pub use reprojection_cache::{BoundaryReprojector, ReprojectionCache};
