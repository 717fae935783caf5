use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Multi-band pixel block (band x row x column)
pub type PixelCube = Array3<f64>;

/// Broad family of a coordinate reference system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsKind {
    /// Projected coordinates (e.g., UTM), linear units assumed to be meters
    Projected,
    /// Geographic coordinates (latitude, longitude) in degrees
    Geographic,
    /// Neither projected nor geographic (local, engineering, unparsable)
    Unknown,
}

impl std::fmt::Display for CrsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrsKind::Projected => write!(f, "projected"),
            CrsKind::Geographic => write!(f, "geographic"),
            CrsKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Coordinate reference system as read from a raster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    /// Normalized identifier, `AUTH:CODE` when known, otherwise WKT
    pub name: String,
    /// Full WKT definition used to rebuild the spatial reference
    pub wkt: String,
    pub kind: CrsKind,
}

impl Crs {
    pub fn new(name: impl Into<String>, wkt: impl Into<String>, kind: CrsKind) -> Self {
        Self {
            name: name.into(),
            wkt: wkt.into(),
            kind,
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Pixel size along each axis, in the raster's native CRS units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Bit-exact grouping key; no tolerance is applied.
    pub fn key(&self) -> (u64, u64) {
        (self.x.to_bits(), self.y.to_bits())
    }
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// GDAL identity transform, reported for rasters without georeferencing
    pub const IDENTITY: GeoTransform = GeoTransform {
        top_left_x: 0.0,
        pixel_width: 1.0,
        rotation_x: 0.0,
        top_left_y: 0.0,
        rotation_y: 0.0,
        pixel_height: 1.0,
    };

    pub fn from_gdal(gt: &[f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    pub fn is_rectilinear(&self) -> bool {
        self.rotation_x == 0.0 && self.rotation_y == 0.0
    }

    /// Per-axis pixel size, matching the usual GIS definition for rotated grids.
    pub fn resolution(&self) -> Resolution {
        if self.is_rectilinear() {
            Resolution::new(self.pixel_width.abs(), self.pixel_height.abs())
        } else {
            Resolution::new(
                self.pixel_width.hypot(self.rotation_y),
                self.rotation_x.hypot(self.pixel_height),
            )
        }
    }

    /// Map a pixel/line position to georeferenced coordinates
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.top_left_x + col * self.pixel_width + row * self.rotation_x,
            self.top_left_y + col * self.rotation_y + row * self.pixel_height,
        )
    }

    /// Map georeferenced coordinates back to fractional (col, row)
    pub fn invert(&self, x: f64, y: f64) -> AuditResult<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.rotation_x * self.rotation_y;
        if det == 0.0 || !det.is_finite() {
            return Err(AuditError::Processing(
                "Geotransform is not invertible".to_string(),
            ));
        }
        let dx = x - self.top_left_x;
        let dy = y - self.top_left_y;
        let col = (dx * self.pixel_height - dy * self.rotation_x) / det;
        let row = (dy * self.pixel_width - dx * self.rotation_y) / det;
        Ok((col, row))
    }

    /// Transform of a sub-window starting at (col_off, row_off)
    pub fn window(&self, col_off: usize, row_off: usize) -> Self {
        let (x, y) = self.apply(col_off as f64, row_off as f64);
        Self {
            top_left_x: x,
            top_left_y: y,
            ..*self
        }
    }
}

/// Rectangular block of pixels inside a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Outcome of opening one raster for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    Opened {
        crs: Option<Crs>,
        resolution: Resolution,
    },
    Failed {
        message: String,
    },
}

/// Metadata record for one raster file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterRecord {
    pub path: PathBuf,
    pub outcome: ProbeOutcome,
}

impl RasterRecord {
    pub fn opened(path: impl Into<PathBuf>, crs: Option<Crs>, resolution: Resolution) -> Self {
        Self {
            path: path.into(),
            outcome: ProbeOutcome::Opened { crs, resolution },
        }
    }

    pub fn failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            outcome: ProbeOutcome::Failed {
                message: message.into(),
            },
        }
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }

    pub fn is_opened(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Opened { .. })
    }

    pub fn crs(&self) -> Option<&Crs> {
        match &self.outcome {
            ProbeOutcome::Opened { crs, .. } => crs.as_ref(),
            ProbeOutcome::Failed { .. } => None,
        }
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match &self.outcome {
            ProbeOutcome::Opened { resolution, .. } => Some(*resolution),
            ProbeOutcome::Failed { .. } => None,
        }
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Error types for raster auditing and clipping
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Boundary has no CRS defined: {0}")]
    MissingBoundaryCrs(String),

    #[error("Boundary contains no geometry: {0}")]
    EmptyBoundary(String),

    #[error("Boundary does not overlap raster: {0}")]
    NoOverlap(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
