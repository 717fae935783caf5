//! rasterprep: audit and clip a folder tree of environmental rasters
//!
//! The inspection side walks a corpus, reads the CRS and pixel size of every
//! raster with GDAL and reports, folder by folder, whether the rasters agree.
//! The clipping side masks every raster to a study-area boundary, reprojecting
//! the boundary once per distinct raster CRS, and mirrors the input tree.

pub mod config;
pub mod core;
pub mod io;
pub mod types;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use crate::config::{ClipConfig, FetchConfig, InspectConfig};
pub use crate::core::{run_clipping, run_inspection, ClipSummary, FolderReport};
pub use crate::io::{run_fetch, FetchSummary};
pub use crate::types::{AuditError, AuditResult, Crs, CrsKind, RasterRecord, Resolution};
