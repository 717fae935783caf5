use crate::types::{
    AuditError, AuditResult, Crs, CrsKind, GeoTransform, PixelCube, PixelWindow, RasterRecord,
};
use gdal::raster::{Buffer, GdalDataType, GdalType, RasterizeOptions};
use gdal::spatial_ref::SpatialRef;
use gdal::vector::Geometry;
use gdal::{Dataset, Driver, DriverManager, Metadata};
use ndarray::{Array2, Array3, Axis};
use num_traits::NumCast;
use std::path::Path;

/// Metadata extraction seam: one file in, one record out, never an error.
pub trait RasterProbe {
    fn probe(&self, path: &Path) -> RasterRecord;
}

/// GDAL-backed metadata reader
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalProbe;

impl GdalProbe {
    fn read_metadata(path: &Path) -> AuditResult<(Option<Crs>, GeoTransform)> {
        let dataset = Dataset::open(path)?;
        Ok((dataset_crs(&dataset), dataset_geo_transform(&dataset)))
    }
}

impl RasterProbe for GdalProbe {
    fn probe(&self, path: &Path) -> RasterRecord {
        match Self::read_metadata(path) {
            Ok((crs, geo_transform)) => {
                log::debug!(
                    "{}: crs={}, geotransform={:?}",
                    path.display(),
                    crs.as_ref().map(|c| c.name.as_str()).unwrap_or("<none>"),
                    geo_transform
                );
                RasterRecord::opened(path, crs, geo_transform.resolution())
            }
            Err(e) => {
                log::warn!("Could not open raster {}: {}", path.display(), e);
                RasterRecord::failed(path, e.to_string())
            }
        }
    }
}

/// Parse a spatial reference and force lon/lat (traditional GIS) axis order.
pub fn spatial_ref_from_wkt(wkt: &str) -> AuditResult<SpatialRef> {
    let srs = SpatialRef::from_wkt(wkt)?;
    srs.set_axis_mapping_strategy(gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);
    Ok(srs)
}

pub fn crs_kind(srs: &SpatialRef) -> CrsKind {
    if srs.is_projected() {
        CrsKind::Projected
    } else if srs.is_geographic() {
        CrsKind::Geographic
    } else {
        CrsKind::Unknown
    }
}

/// `AUTH:CODE` when an authority can be identified, else the WKT itself.
fn normalized_name(srs: &mut SpatialRef, wkt: &str) -> String {
    if srs.auth_code().is_err() {
        let _ = srs.auto_identify_epsg();
    }
    match (srs.auth_name(), srs.auth_code()) {
        (Ok(auth), Ok(code)) => format!("{}:{}", auth, code),
        _ => wkt.to_string(),
    }
}

/// Build a `Crs` from a projection string; an empty string means no CRS.
pub fn crs_from_wkt(wkt: &str) -> Option<Crs> {
    if wkt.trim().is_empty() {
        return None;
    }
    match SpatialRef::from_wkt(wkt) {
        Ok(mut srs) => {
            let kind = crs_kind(&srs);
            let name = normalized_name(&mut srs, wkt);
            Some(Crs::new(name, wkt, kind))
        }
        Err(e) => {
            log::warn!("Unparsable projection, keeping it as an opaque CRS: {}", e);
            Some(Crs::new(wkt, wkt, CrsKind::Unknown))
        }
    }
}

pub fn dataset_crs(dataset: &Dataset) -> Option<Crs> {
    crs_from_wkt(&dataset.projection())
}

/// Geotransform of a dataset; rasters without one get the identity transform.
pub fn dataset_geo_transform(dataset: &Dataset) -> GeoTransform {
    match dataset.geo_transform() {
        Ok(gt) => GeoTransform::from_gdal(&gt),
        Err(e) => {
            log::debug!("No geotransform, assuming identity: {}", e);
            GeoTransform::IDENTITY
        }
    }
}

/// Everything needed to write a raster that mirrors a source dataset
#[derive(Debug, Clone)]
pub struct RasterProfile {
    pub driver: String,
    pub width: usize,
    pub height: usize,
    pub data_type: GdalDataType,
    pub geo_transform: GeoTransform,
    pub projection: String,
    /// One entry per band
    pub nodata: Vec<Option<f64>>,
}

impl RasterProfile {
    pub fn band_count(&self) -> usize {
        self.nodata.len()
    }

    /// Same raster description restricted to a window
    pub fn cropped(&self, window: &PixelWindow) -> Self {
        Self {
            width: window.width,
            height: window.height,
            geo_transform: self.geo_transform.window(window.col_off, window.row_off),
            ..self.clone()
        }
    }
}

pub fn read_profile(dataset: &Dataset) -> AuditResult<RasterProfile> {
    let (width, height) = dataset.raster_size();
    let band_count = dataset.raster_count() as usize;
    if band_count == 0 {
        return Err(AuditError::Processing("Raster has no bands".to_string()));
    }

    let mut nodata = Vec::with_capacity(band_count);
    for band_index in 1..=band_count {
        nodata.push(dataset.rasterband(band_index as _)?.no_data_value());
    }
    let data_type = dataset.rasterband(1)?.band_type();

    Ok(RasterProfile {
        driver: dataset.driver().short_name(),
        width: width as usize,
        height: height as usize,
        data_type,
        geo_transform: dataset_geo_transform(dataset),
        projection: dataset.projection(),
        nodata,
    })
}

/// Read every band of a window as f64 (band x row x column)
pub fn read_window(dataset: &Dataset, window: &PixelWindow) -> AuditResult<PixelCube> {
    let band_count = dataset.raster_count() as usize;
    let mut cube = Array3::<f64>::zeros((band_count, window.height, window.width));

    for (i, mut plane) in cube.axis_iter_mut(Axis(0)).enumerate() {
        let rasterband = dataset.rasterband((i + 1) as _)?;
        let buffer = rasterband.read_as::<f64>(
            (window.col_off as isize, window.row_off as isize),
            (window.width, window.height),
            (window.width, window.height),
            None,
        )?;
        let band = Array2::from_shape_vec((window.height, window.width), buffer.data)?;
        plane.assign(&band);
    }

    log::debug!(
        "Read {} band(s) of {}x{} at ({}, {})",
        band_count,
        window.width,
        window.height,
        window.col_off,
        window.row_off
    );
    Ok(cube)
}

/// Burn a geometry onto a grid: 1 where a pixel center falls inside, 0 elsewhere.
pub fn rasterize_mask(
    geometry: &Geometry,
    geo_transform: &GeoTransform,
    projection: &str,
    width: usize,
    height: usize,
) -> AuditResult<Array2<u8>> {
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut grid = driver.create_with_band_type::<u8, _>("", width as _, height as _, 1)?;
    grid.set_geo_transform(&geo_transform.to_gdal())?;
    if !projection.is_empty() {
        grid.set_projection(projection)?;
    }

    gdal::raster::rasterize(
        &mut grid,
        &[1],
        std::slice::from_ref(geometry),
        &[1.0],
        Some(RasterizeOptions::default()),
    )?;

    let buffer = grid
        .rasterband(1)?
        .read_as::<u8>((0, 0), (width, height), (width, height), None)?;
    Ok(Array2::from_shape_vec((height, width), buffer.data)?)
}

/// Drivers that advertise `Create` but cannot hold pixels written band by band
const NON_WRITABLE_DRIVERS: [&str; 2] = ["VRT", "MEM"];

/// Driver used for output: the source driver if it can create files, else GTiff.
pub fn output_driver(source_driver: &str) -> AuditResult<Driver> {
    let writable = !NON_WRITABLE_DRIVERS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(source_driver));
    if writable {
        if let Ok(driver) = DriverManager::get_driver_by_name(source_driver) {
            if driver.metadata_item("DCAP_CREATE", "").as_deref() == Some("YES") {
                return Ok(driver);
            }
        }
    }
    log::info!(
        "Driver {} cannot create new rasters, writing GTiff instead",
        source_driver
    );
    Ok(DriverManager::get_driver_by_name("GTiff")?)
}

/// Create a new raster with the profile's band type and write the cube into it.
pub fn write_raster<P: AsRef<Path>>(
    path: P,
    profile: &RasterProfile,
    data: &PixelCube,
) -> AuditResult<()> {
    let (bands, rows, cols) = data.dim();
    if bands != profile.band_count() || rows != profile.height || cols != profile.width {
        return Err(AuditError::Processing(format!(
            "Pixel block {}x{}x{} does not match profile {}x{}x{}",
            bands,
            rows,
            cols,
            profile.band_count(),
            profile.height,
            profile.width
        )));
    }

    let write: fn(&Driver, &Path, &RasterProfile, &PixelCube) -> AuditResult<()> =
        match profile.data_type {
            GdalDataType::UInt8 => write_typed::<u8>,
            GdalDataType::UInt16 => write_typed::<u16>,
            GdalDataType::Int16 => write_typed::<i16>,
            GdalDataType::UInt32 => write_typed::<u32>,
            GdalDataType::Int32 => write_typed::<i32>,
            GdalDataType::Float32 => write_typed::<f32>,
            GdalDataType::Float64 => write_typed::<f64>,
            other => {
                return Err(AuditError::Processing(format!(
                    "Band type {:?} cannot be written without changing it",
                    other
                )))
            }
        };

    let driver = output_driver(&profile.driver)?;
    write(&driver, path.as_ref(), profile, data)
}

fn write_typed<T: GdalType + NumCast + Copy>(
    driver: &Driver,
    path: &Path,
    profile: &RasterProfile,
    data: &PixelCube,
) -> AuditResult<()> {
    let mut dataset = driver.create_with_band_type::<T, _>(
        path,
        profile.width as _,
        profile.height as _,
        profile.band_count() as _,
    )?;
    dataset.set_geo_transform(&profile.geo_transform.to_gdal())?;
    if !profile.projection.is_empty() {
        dataset.set_projection(&profile.projection)?;
    }

    for (i, plane) in data.axis_iter(Axis(0)).enumerate() {
        let mut rasterband = dataset.rasterband((i + 1) as _)?;
        let values = plane
            .iter()
            .map(|&v| {
                <T as NumCast>::from(v).ok_or_else(|| {
                    AuditError::Processing(format!("Value {} does not fit the band type", v))
                })
            })
            .collect::<AuditResult<Vec<T>>>()?;
        let buffer = Buffer::new((profile.width, profile.height), values);
        rasterband.write((0, 0), (profile.width, profile.height), &buffer)?;

        if let Some(nodata) = profile.nodata[i] {
            rasterband.set_no_data_value(Some(nodata))?;
        }
    }

    log::debug!("Wrote {} band(s) to {}", profile.band_count(), path.display());
    Ok(())
}
