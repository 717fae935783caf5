//! Filesystem, GDAL and network access

pub mod boundary;
pub mod fetch;
pub mod raster;
pub mod walker;
pub mod writer;

pub use boundary::Boundary;
pub use fetch::{run_fetch, Downloader, FetchSummary};
pub use raster::{GdalProbe, RasterProbe, RasterProfile};
pub use walker::{CorpusWalker, RasterFolder};
pub use writer::OutputTree;
