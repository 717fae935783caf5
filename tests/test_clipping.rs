mod common;

use common::{init_logging, write_geotiff, write_square_geojson, write_vrt, write_with_driver};
use gdal::Dataset;
use rasterprep::{run_clipping, AuditError, ClipConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UTM_1KM: [f64; 6] = [480000.0, 1000.0, 0.0, 4790000.0, 0.0, -1000.0];
const WGS84_FINE: [f64; 6] = [20.5, 0.01, 0.0, 43.5, 0.0, -0.01];
const FAR_AWAY: [f64; 6] = [0.0, 0.01, 0.0, 10.0, 0.0, -0.01];

fn build_corpus(root: &Path) {
    let raw = root.join("raw");
    write_geotiff(
        &raw.join("2 topo/utm.tif"),
        Some(32634),
        UTM_1KM,
        (40, 60),
        5.0,
        Some(-9999.0),
    );
    write_geotiff(
        &raw.join("5 CHELSA/pr/2001/geo.tif"),
        Some(4326),
        WGS84_FINE,
        (100, 100),
        7.0,
        None,
    );
    write_geotiff(&raw.join("9 misc/nocrs.tif"), None, UTM_1KM, (10, 10), 1.0, None);
    write_geotiff(&raw.join("9 misc/outside.tif"), Some(4326), FAR_AWAY, (10, 10), 1.0, None);
    write_square_geojson(&root.join("boundary.geojson"), 20.9, 42.9, 21.1, 43.1);
}

fn config_for(root: &Path) -> ClipConfig {
    ClipConfig {
        boundary_path: root.join("boundary.geojson"),
        input_root: root.join("raw"),
        output_root: root.join("clipped"),
        ..ClipConfig::default()
    }
}

#[test]
fn test_clip_mirrors_tree_and_masks() {
    init_logging();
    let tmp = TempDir::new().expect("Failed to create temp dir");
    build_corpus(tmp.path());
    let config = config_for(tmp.path());

    let summary = run_clipping(&config).expect("Clipping failed");
    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped_missing_crs, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped_existing, 0);
    // One reprojection per distinct raster CRS
    assert_eq!(summary.reprojections, 2);

    let utm_out = config.output_root.join("2 topo/utm.tif");
    let geo_out = config.output_root.join("5 CHELSA/pr/2001/geo.tif");
    assert!(utm_out.exists());
    assert!(geo_out.exists());
    assert!(!config.output_root.join("9 misc/nocrs.tif").exists());
    assert!(!config.output_root.join("9 misc/outside.tif").exists());

    let dataset = Dataset::open(&utm_out).expect("Failed to open clipped raster");
    let (width, height) = dataset.raster_size();
    assert!(width > 0 && width < 40, "width {}", width);
    assert!(height > 0 && height < 60, "height {}", height);
    assert!(dataset.projection().contains("32634"));

    let band = dataset.rasterband(1).expect("Missing band");
    assert_eq!(band.no_data_value(), Some(-9999.0));
    let pixels = band
        .read_as::<f32>((0, 0), (width, height), (width, height), None)
        .expect("Failed to read pixels");
    assert!(pixels.data.iter().all(|&v| v == 5.0 || v == -9999.0));
    assert!(pixels.data.iter().any(|&v| v == 5.0));

    let dataset = Dataset::open(&geo_out).expect("Failed to open clipped raster");
    let (width, height) = dataset.raster_size();
    assert!((19..=22).contains(&width), "width {}", width);
    assert!((19..=22).contains(&height), "height {}", height);
    let gt = dataset.geo_transform().expect("Missing geotransform");
    approx::assert_relative_eq!(gt[1], 0.01, epsilon = 1e-12);
    approx::assert_relative_eq!(gt[5], -0.01, epsilon = 1e-12);
}

#[test]
fn test_second_run_is_a_no_op() {
    init_logging();
    let tmp = TempDir::new().expect("Failed to create temp dir");
    build_corpus(tmp.path());
    let config = config_for(tmp.path());

    let first = run_clipping(&config).expect("First run failed");
    assert_eq!(first.written, 2);
    let utm_out = config.output_root.join("2 topo/utm.tif");
    let before = fs::read(&utm_out).expect("Missing output");

    let second = run_clipping(&config).expect("Second run failed");
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped_existing, 2);
    assert_eq!(fs::read(&utm_out).expect("Missing output"), before);
}

#[test]
fn test_boundary_without_crs_aborts_the_run() {
    init_logging();
    let tmp = TempDir::new().expect("Failed to create temp dir");
    build_corpus(tmp.path());
    let csv = tmp.path().join("boundary.csv");
    fs::write(
        &csv,
        "id,WKT\n1,\"POLYGON ((20.9 42.9,21.1 42.9,21.1 43.1,20.9 43.1,20.9 42.9))\"\n",
    )
    .expect("Failed to write CSV boundary");

    let config = ClipConfig {
        boundary_path: csv,
        ..config_for(tmp.path())
    };
    let result = run_clipping(&config);
    assert!(matches!(result, Err(AuditError::MissingBoundaryCrs(_))));
    assert!(!config.output_root.exists());
}

#[test]
fn test_vrt_and_erdas_inputs_are_clipped() {
    init_logging();
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let root = tmp.path();
    write_square_geojson(&root.join("boundary.geojson"), 20.9, 42.9, 21.1, 43.1);

    // The VRT source lives outside the walked tree
    let base = root.join("sources/base.tif");
    write_geotiff(&base, Some(4326), WGS84_FINE, (100, 100), 7.0, None);
    write_vrt(&root.join("raw/mosaic/pr.vrt"), &base, 4326, WGS84_FINE, (100, 100));
    write_with_driver(
        "HFA",
        &root.join("raw/soil/depth.img"),
        Some(4326),
        WGS84_FINE,
        (100, 100),
        3.0,
        Some(-9999.0),
    );

    let config = config_for(root);
    let summary = run_clipping(&config).expect("Clipping failed");
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.written, 2);

    let vrt_out = Dataset::open(config.output_root.join("mosaic/pr.vrt"))
        .expect("Failed to open clipped VRT input");
    assert_eq!(vrt_out.driver().short_name(), "GTiff");
    let (width, height) = vrt_out.raster_size();
    assert!((19..=22).contains(&width), "width {}", width);
    assert!((19..=22).contains(&height), "height {}", height);
    let band = vrt_out.rasterband(1).expect("Missing band");
    assert_eq!(band.no_data_value(), Some(-9999.0));
    let pixels = band
        .read_as::<f32>((0, 0), (width, height), (width, height), None)
        .expect("Failed to read pixels");
    assert!(pixels.data.iter().any(|&v| v == 7.0));

    let img_out = Dataset::open(config.output_root.join("soil/depth.img"))
        .expect("Failed to open clipped ERDAS raster");
    assert_eq!(img_out.driver().short_name(), "HFA");
    assert!(img_out.projection().contains("4326") || img_out.projection().contains("WGS"));
    let (width, height) = img_out.raster_size();
    assert!(width < 100 && height < 100);
}
