use crate::core::classify::describe_resolution;
use crate::core::grouping::{group_records, CrsGroup, ResolutionGroup};
use crate::types::{AuditResult, ProbeOutcome, RasterRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Width of the rule line separating folder blocks
pub const RULE_WIDTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRaster {
    pub file: String,
    pub error: String,
}

/// Audit result for one folder of the corpus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderReport {
    pub folder: PathBuf,
    pub raster_count: usize,
    pub opened_count: usize,
    pub failed: Vec<FailedRaster>,
    pub missing_crs: Vec<String>,
    pub crs_groups: Vec<CrsGroup>,
    pub resolution_groups: Vec<ResolutionGroup>,
    /// True iff no missing CRS, exactly one CRS group and one resolution group
    pub consistent: bool,
}

impl FolderReport {
    pub fn from_records<P: Into<PathBuf>>(folder: P, records: &[RasterRecord]) -> Self {
        let failed = records
            .iter()
            .filter_map(|r| match &r.outcome {
                ProbeOutcome::Failed { message } => Some(FailedRaster {
                    file: r.file_name(),
                    error: message.clone(),
                }),
                ProbeOutcome::Opened { .. } => None,
            })
            .collect();

        let groups = group_records(records);
        let consistent = groups.is_consistent();

        Self {
            folder: folder.into(),
            raster_count: records.len(),
            opened_count: records.iter().filter(|r| r.is_opened()).count(),
            failed,
            missing_crs: groups.missing_crs,
            crs_groups: groups.crs_groups,
            resolution_groups: groups.resolution_groups,
            consistent,
        }
    }

    /// Text block for this folder, one entry per line
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push("=".repeat(RULE_WIDTH));
        lines.push(format!("Folder: {}", self.folder.display()));
        lines.push(format!("  Rasters found: {}", self.raster_count));
        lines.push(format!("  Successfully opened: {}", self.opened_count));
        if !self.failed.is_empty() {
            lines.push("  Could not open these rasters:".to_string());
            for f in &self.failed {
                lines.push(format!("    - {} (error: {})", f.file, f.error));
            }
        }

        lines.push(String::new());
        if self.missing_crs.is_empty() {
            lines.push("  All rasters have a CRS defined.".to_string());
        } else {
            lines.push("  Rasters WITHOUT CRS defined:".to_string());
            for file in &self.missing_crs {
                lines.push(format!("    - {}", file));
            }
        }

        match self.crs_groups.as_slice() {
            [] => lines.push(
                "  No CRS information could be read from any raster in this folder.".to_string(),
            ),
            [only] if self.missing_crs.is_empty() => {
                lines.push(format!("  All rasters share the same CRS: {}", only.crs.name));
            }
            groups => {
                lines.push(format!("  Multiple CRS detected ({}):", groups.len()));
                for group in groups {
                    lines.push(format!("    CRS: {}", group.crs.name));
                    for file in &group.files {
                        lines.push(format!("      - {}", file));
                    }
                }
            }
        }

        lines.push(String::new());
        match self.resolution_groups.as_slice() {
            [] => lines.push("  No resolution information found.".to_string()),
            [only] => lines.push(format!(
                "  All rasters share the same resolution: {}",
                describe_resolution(only.resolution, only.crs_kind)
            )),
            groups => {
                lines.push("  Multiple resolutions detected:".to_string());
                for group in groups {
                    lines.push(format!(
                        "    Resolution {}:",
                        describe_resolution(group.resolution, group.crs_kind)
                    ));
                    for file in &group.files {
                        lines.push(format!("      - {}", file));
                    }
                }
            }
        }

        if self.consistent {
            let crs = &self.crs_groups[0].crs.name;
            let res = &self.resolution_groups[0];
            lines.push(String::new());
            lines.push(format!(
                "  Summary: all rasters in this folder share CRS {} and resolution {}.",
                crs,
                describe_resolution(res.resolution, res.crs_kind)
            ));
        }

        lines.push(String::new());
        lines
    }
}

/// Materialize all folder blocks, in walk order, as one string
pub fn render_report(reports: &[FolderReport]) -> String {
    reports
        .iter()
        .flat_map(|r| r.lines())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the whole report in one go
pub fn write_report<P: AsRef<Path>>(path: P, reports: &[FolderReport]) -> AuditResult<()> {
    let text = render_report(reports);
    std::fs::write(path.as_ref(), text)?;
    log::info!(
        "Report with {} folder(s) saved to: {}",
        reports.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Machine-readable export of the same folder reports
pub fn write_json<P: AsRef<Path>>(path: P, reports: &[FolderReport]) -> AuditResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), reports)?;
    log::info!("JSON report saved to: {}", path.as_ref().display());
    Ok(())
}
