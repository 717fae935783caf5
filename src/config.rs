//! Run configuration for inspection, clipping and corpus download.
//!
//! Every config has sensible defaults, can be read from a JSON file and is
//! then overridden field by field from the command line.

use crate::types::{AuditError, AuditResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raster extensions recognized when walking a corpus (compared case-insensitively)
pub const RASTER_EXTENSIONS: [&str; 4] = [".tif", ".tiff", ".img", ".vrt"];

/// Default file name of the inspection report
pub const DEFAULT_REPORT_NAME: &str = "raster_report.txt";

fn default_extensions() -> Vec<String> {
    RASTER_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// Settings for the CRS/resolution audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    /// Root of the raw raster corpus
    pub root: PathBuf,
    /// Plain-text report destination
    pub report_path: PathBuf,
    /// Optional JSON export of the folder reports
    pub json_path: Option<PathBuf>,
    pub extensions: Vec<String>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            report_path: PathBuf::from(DEFAULT_REPORT_NAME),
            json_path: None,
            extensions: default_extensions(),
        }
    }
}

/// Settings for clipping a corpus to a study-area boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Vector file holding the study-area polygon(s)
    pub boundary_path: PathBuf,
    /// Root of the raw raster corpus
    pub input_root: PathBuf,
    /// Root of the mirrored, clipped output tree
    pub output_root: PathBuf,
    pub extensions: Vec<String>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            boundary_path: PathBuf::new(),
            input_root: PathBuf::from("."),
            output_root: PathBuf::from("clipped"),
            extensions: default_extensions(),
        }
    }
}

impl ClipConfig {
    pub fn validate(&self) -> AuditResult<()> {
        if self.boundary_path.as_os_str().is_empty() {
            return Err(AuditError::Config("boundary path is not set".to_string()));
        }
        if self.input_root == self.output_root {
            return Err(AuditError::Config(format!(
                "output root must differ from input root ({})",
                self.input_root.display()
            )));
        }
        Ok(())
    }
}

/// Settings for downloading a list of raster URLs into per-year folders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Text file with one URL per line
    pub url_list: PathBuf,
    /// Folder receiving `<year>/<file name>`
    pub output_folder: PathBuf,
    pub first_year: i32,
    pub last_year: i32,
    pub retries: u32,
    pub timeout_secs: u64,
    pub retry_pause_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_list: PathBuf::new(),
            output_folder: PathBuf::from("."),
            first_year: 2000,
            last_year: 2020,
            retries: 3,
            timeout_secs: 60,
            retry_pause_secs: 2,
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> AuditResult<()> {
        if self.first_year > self.last_year {
            return Err(AuditError::Config(format!(
                "year range is empty: {}..={}",
                self.first_year, self.last_year
            )));
        }
        if self.retries == 0 {
            return Err(AuditError::Config("retries must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn accepts_year(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }
}

/// Load any of the configs from a JSON file; missing fields keep their defaults.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> AuditResult<T> {
    log::debug!("Loading configuration from: {}", path.as_ref().display());
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&text)?)
}
