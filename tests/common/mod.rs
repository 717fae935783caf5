#![allow(dead_code)]

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use std::path::Path;

/// Write a single-band Float32 GeoTIFF filled with `value`
pub fn write_geotiff(
    path: &Path,
    epsg: Option<u32>,
    geo_transform: [f64; 6],
    size: (usize, usize),
    value: f32,
    nodata: Option<f64>,
) {
    write_with_driver("GTiff", path, epsg, geo_transform, size, value, nodata);
}

/// Same as `write_geotiff` with any GDAL driver that supports `Create`
pub fn write_with_driver(
    driver_name: &str,
    path: &Path,
    epsg: Option<u32>,
    geo_transform: [f64; 6],
    size: (usize, usize),
    value: f32,
    nodata: Option<f64>,
) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create raster folder");
    }
    let driver = DriverManager::get_driver_by_name(driver_name).expect("Driver missing");
    let mut dataset = driver
        .create_with_band_type::<f32, _>(path, size.0 as _, size.1 as _, 1)
        .expect("Failed to create raster");
    dataset
        .set_geo_transform(&geo_transform)
        .expect("Failed to set geotransform");
    if let Some(code) = epsg {
        let wkt = SpatialRef::from_epsg(code)
            .and_then(|srs| srs.to_wkt())
            .expect("Failed to build WKT");
        dataset.set_projection(&wkt).expect("Failed to set projection");
    }

    let mut band = dataset.rasterband(1).expect("Missing band 1");
    let buffer = Buffer::new(size, vec![value; size.0 * size.1]);
    band.write((0, 0), size, &buffer).expect("Failed to write pixels");
    if nodata.is_some() {
        band.set_no_data_value(nodata).expect("Failed to set nodata");
    }
}

/// Single-square GeoJSON boundary in WGS84 lon/lat
pub fn write_square_geojson(path: &Path, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) {
    let geojson = format!(
        r#"{{"type":"FeatureCollection","features":[{{"type":"Feature","properties":{{"name":"study area"}},"geometry":{{"type":"Polygon","coordinates":[[[{a},{b}],[{c},{b}],[{c},{d}],[{a},{d}],[{a},{b}]]]}}}}]}}"#,
        a = min_lon,
        b = min_lat,
        c = max_lon,
        d = max_lat
    );
    std::fs::write(path, geojson).expect("Failed to write GeoJSON boundary");
}

/// Hand-written VRT exposing band 1 of `source` with its own grid and CRS
pub fn write_vrt(path: &Path, source: &Path, epsg: u32, geo_transform: [f64; 6], size: (usize, usize)) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create raster folder");
    }
    let gt = geo_transform
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let xml = format!(
        r#"<VRTDataset rasterXSize="{w}" rasterYSize="{h}">
  <SRS>EPSG:{epsg}</SRS>
  <GeoTransform>{gt}</GeoTransform>
  <VRTRasterBand dataType="Float32" band="1">
    <NoDataValue>-9999</NoDataValue>
    <SimpleSource>
      <SourceFilename relativeToVRT="0">{src}</SourceFilename>
      <SourceBand>1</SourceBand>
    </SimpleSource>
  </VRTRasterBand>
</VRTDataset>
"#,
        w = size.0,
        h = size.1,
        epsg = epsg,
        gt = gt,
        src = source.display()
    );
    std::fs::write(path, xml).expect("Failed to write VRT");
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
