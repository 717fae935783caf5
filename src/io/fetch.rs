//! Download of raster URL lists into per-year folders.

use crate::config::FetchConfig;
use crate::types::{file_name_of, AuditError, AuditResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"_((?:19|20)\d{2})_").expect("static regex"))
}

/// Acquisition year embedded in a URL as `_YYYY_` (1900-2099)
pub fn extract_year(url: &str) -> Option<i32> {
    year_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Non-empty, trimmed lines of a URL list file
pub fn read_url_list<P: AsRef<Path>>(path: P) -> AuditResult<Vec<String>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// What to do with one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    Download { url: String, target: PathBuf },
    NoYear,
    OutOfRange(i32),
}

pub fn plan_download(url: &str, config: &FetchConfig) -> FetchPlan {
    let Some(year) = extract_year(url) else {
        return FetchPlan::NoYear;
    };
    if !config.accepts_year(year) {
        return FetchPlan::OutOfRange(year);
    }

    let file_name = url
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .map(|n| n.split(['?', '#']).next().unwrap_or(n).to_string())
        .unwrap_or_else(|| format!("{}.tif", year));

    FetchPlan::Download {
        url: url.to_string(),
        target: config.output_folder.join(year.to_string()).join(file_name),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    AlreadyPresent,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped_existing: usize,
    pub skipped_no_year: usize,
    pub skipped_out_of_range: usize,
    pub failed: usize,
}

/// Blocking HTTP downloader with a fixed number of attempts per file
pub struct Downloader {
    client: reqwest::blocking::Client,
    retries: u32,
    retry_pause: Duration,
}

impl Downloader {
    pub fn new(config: &FetchConfig) -> AuditResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("rasterprep/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            retries: config.retries,
            retry_pause: Duration::from_secs(config.retry_pause_secs),
        })
    }

    /// Fetch `url` into `target` unless it already exists.
    pub fn download(&self, url: &str, target: &Path) -> DownloadStatus {
        if target.exists() {
            log::info!("[SKIP] {} already exists", target.display());
            return DownloadStatus::AlreadyPresent;
        }

        for attempt in 1..=self.retries {
            log::info!("[DOWNLOADING] {} (attempt {} of {})", url, attempt, self.retries);
            match self.try_download_once(url, target) {
                Ok(bytes) => {
                    log::info!("[DONE] {} ({} bytes)", target.display(), bytes);
                    return DownloadStatus::Downloaded;
                }
                Err(e) => {
                    log::warn!("[ERROR] Attempt {}: {}", attempt, e);
                    if attempt < self.retries {
                        std::thread::sleep(self.retry_pause);
                    }
                }
            }
        }

        log::error!("[FAILED] Could not download {}", url);
        DownloadStatus::Failed
    }

    fn try_download_once(&self, url: &str, target: &Path) -> AuditResult<u64> {
        let mut response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(AuditError::Processing(format!(
                "Status {} for {}",
                response.status().as_u16(),
                url
            )));
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let partial = target.with_file_name(format!(".{}.partial", file_name_of(target)));
        let copied = {
            let mut file = std::fs::File::create(&partial)?;
            response.copy_to(&mut file)
        };
        match copied {
            Ok(bytes) => {
                std::fs::rename(&partial, target)?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = std::fs::remove_file(&partial);
                Err(e.into())
            }
        }
    }
}

/// Download every in-range URL of the configured list.
pub fn run_fetch(config: &FetchConfig) -> AuditResult<FetchSummary> {
    config.validate()?;
    std::fs::create_dir_all(&config.output_folder)?;

    let urls = read_url_list(&config.url_list)?;
    log::info!(
        "Processing {} ({} URLs) -> {}",
        config.url_list.display(),
        urls.len(),
        config.output_folder.display()
    );

    let downloader = Downloader::new(config)?;
    let mut summary = FetchSummary::default();

    for url in &urls {
        match plan_download(url, config) {
            FetchPlan::NoYear => {
                log::warn!("[WARNING] Could not extract year: {}", url);
                summary.skipped_no_year += 1;
            }
            FetchPlan::OutOfRange(year) => {
                log::debug!("Year {} outside {}..={}: {}", year, config.first_year, config.last_year, url);
                summary.skipped_out_of_range += 1;
            }
            FetchPlan::Download { url, target } => match downloader.download(&url, &target) {
                DownloadStatus::Downloaded => summary.downloaded += 1,
                DownloadStatus::AlreadyPresent => summary.skipped_existing += 1,
                DownloadStatus::Failed => summary.failed += 1,
            },
        }
    }

    log::info!(
        "Downloads finished for {}..={}: {} new, {} present, {} failed",
        config.first_year,
        config.last_year,
        summary.downloaded,
        summary.skipped_existing,
        summary.failed
    );
    Ok(summary)
}
