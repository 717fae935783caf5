use crate::config::InspectConfig;
use crate::core::report::{write_json, write_report, FolderReport};
use crate::io::raster::{GdalProbe, RasterProbe};
use crate::io::walker::{CorpusWalker, RasterFolder};
use crate::types::{AuditError, AuditResult, RasterRecord};

/// Probe every raster of one folder, in discovery order, and summarize it
pub fn inspect_folder<P: RasterProbe>(probe: &P, folder: &RasterFolder) -> FolderReport {
    let records: Vec<RasterRecord> = folder.file_paths().map(|p| probe.probe(&p)).collect();
    let report = FolderReport::from_records(&folder.path, &records);

    log::info!(
        "{}: {} raster(s), {} opened, {}",
        folder.path.display(),
        report.raster_count,
        report.opened_count,
        if report.consistent { "consistent" } else { "inconsistent" }
    );
    report
}

/// Folder reports for the whole corpus, in walk order
pub fn inspect_corpus<P: RasterProbe>(probe: &P, walker: &CorpusWalker) -> Vec<FolderReport> {
    walker
        .folders()
        .map(|folder| inspect_folder(probe, &folder))
        .collect()
}

/// Walk the configured corpus with GDAL and write the text (and JSON) report.
pub fn run_inspection(config: &InspectConfig) -> AuditResult<Vec<FolderReport>> {
    if !config.root.is_dir() {
        return Err(AuditError::Config(format!(
            "corpus root is not a directory: {}",
            config.root.display()
        )));
    }

    log::info!("Inspecting rasters under: {}", config.root.display());
    let walker = CorpusWalker::new(&config.root, &config.extensions);
    let reports = inspect_corpus(&GdalProbe, &walker);

    write_report(&config.report_path, &reports)?;
    if let Some(json_path) = &config.json_path {
        write_json(json_path, &reports)?;
    }

    let inconsistent = reports.iter().filter(|r| !r.consistent).count();
    log::info!(
        "Inspected {} folder(s), {} inconsistent",
        reports.len(),
        inconsistent
    );
    Ok(reports)
}
