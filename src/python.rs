use crate::config::{ClipConfig, InspectConfig};
use crate::core::report::render_report;
use crate::{run_clipping, run_inspection};
use pyo3::prelude::*;
use std::path::PathBuf;

fn to_py_err(e: crate::AuditError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e))
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(inspect_rasters, m)?)?;
    m.add_function(wrap_pyfunction!(clip_rasters, m)?)?;
    Ok(())
}

/// Audit every raster folder under `root`, write the report and return its text
#[pyfunction]
#[pyo3(signature = (root, report_path = None))]
fn inspect_rasters(root: String, report_path: Option<String>) -> PyResult<String> {
    let mut config = InspectConfig {
        root: PathBuf::from(root),
        ..InspectConfig::default()
    };
    if let Some(path) = report_path {
        config.report_path = PathBuf::from(path);
    }

    let reports = run_inspection(&config).map_err(to_py_err)?;
    Ok(render_report(&reports))
}

/// Clip every raster under `raw_root` to `boundary`; returns (written, skipped, failed)
#[pyfunction]
fn clip_rasters(
    boundary: String,
    raw_root: String,
    clipped_root: String,
) -> PyResult<(usize, usize, usize)> {
    let config = ClipConfig {
        boundary_path: PathBuf::from(boundary),
        input_root: PathBuf::from(raw_root),
        output_root: PathBuf::from(clipped_root),
        ..ClipConfig::default()
    };

    let summary = run_clipping(&config).map_err(to_py_err)?;
    Ok((
        summary.written,
        summary.skipped_existing + summary.skipped_missing_crs,
        summary.failed,
    ))
}
