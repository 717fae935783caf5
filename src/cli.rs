use clap::{Args as ClapArgs, Parser, Subcommand};
use rasterprep::config::load_json;
use rasterprep::{AuditResult, ClipConfig, FetchConfig, InspectConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rasterprep")]
#[command(about = "Audit and clip a folder tree of georeferenced rasters")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report CRS and resolution consistency per folder
    Inspect(InspectArgs),
    /// Clip every raster to a study-area boundary
    Clip(ClipArgs),
    /// Download a URL list into per-year folders
    Fetch(FetchArgs),
}

#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// Root folder of the raster corpus
    #[arg(value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Text report destination
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Also export the folder reports as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// JSON config file; command line values take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl InspectArgs {
    pub fn into_config(self) -> AuditResult<InspectConfig> {
        let mut config: InspectConfig = match &self.config {
            Some(path) => load_json(path)?,
            None => InspectConfig::default(),
        };
        if let Some(root) = self.root {
            config.root = root;
        }
        if let Some(report) = self.report {
            config.report_path = report;
        }
        if self.json.is_some() {
            config.json_path = self.json;
        }
        Ok(config)
    }
}

#[derive(ClapArgs, Debug)]
pub struct ClipArgs {
    /// Boundary vector file (shapefile, GeoPackage, GeoJSON...)
    #[arg(short, long, value_name = "FILE")]
    pub boundary: Option<PathBuf>,

    /// Root folder of the raw rasters
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Root folder of the clipped output tree
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// JSON config file; command line values take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ClipArgs {
    pub fn into_config(self) -> AuditResult<ClipConfig> {
        let mut config: ClipConfig = match &self.config {
            Some(path) => load_json(path)?,
            None => ClipConfig::default(),
        };
        if let Some(boundary) = self.boundary {
            config.boundary_path = boundary;
        }
        if let Some(input) = self.input {
            config.input_root = input;
        }
        if let Some(output) = self.output {
            config.output_root = output;
        }
        Ok(config)
    }
}

#[derive(ClapArgs, Debug)]
pub struct FetchArgs {
    /// Text file with one URL per line
    #[arg(short, long, value_name = "FILE")]
    pub urls: Option<PathBuf>,

    /// Folder receiving the per-year subfolders
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// First acquisition year to keep
    #[arg(long, value_name = "YEAR")]
    pub from: Option<i32>,

    /// Last acquisition year to keep
    #[arg(long, value_name = "YEAR")]
    pub to: Option<i32>,

    /// JSON config file; command line values take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl FetchArgs {
    pub fn into_config(self) -> AuditResult<FetchConfig> {
        let mut config: FetchConfig = match &self.config {
            Some(path) => load_json(path)?,
            None => FetchConfig::default(),
        };
        if let Some(urls) = self.urls {
            config.url_list = urls;
        }
        if let Some(output) = self.output {
            config.output_folder = output;
        }
        if let Some(from) = self.from {
            config.first_year = from;
        }
        if let Some(to) = self.to {
            config.last_year = to;
        }
        Ok(config)
    }
}
