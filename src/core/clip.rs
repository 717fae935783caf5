use crate::core::reprojection_cache::{BoundaryReprojector, ReprojectionCache};
use crate::io::raster::{dataset_crs, rasterize_mask, read_profile, read_window, RasterProfile};
use crate::types::{AuditError, AuditResult, GeoTransform, PixelCube, PixelWindow};
use gdal::vector::Geometry;
use gdal::Dataset;
use ndarray::{Array2, Axis, Zip};
use std::path::Path;

/// Axis-aligned extent in georeferenced coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(geometry: &Geometry) -> Self {
        let env = geometry.envelope();
        Self {
            min_x: env.MinX,
            max_x: env.MaxX,
            min_y: env.MinY,
            max_y: env.MaxY,
        }
    }
}

/// Smallest pixel window covering `bounds`, clipped to the raster grid.
///
/// Fails with `NoOverlap` when the extent misses the raster entirely.
pub fn crop_window(
    bounds: &Bounds,
    geo_transform: &GeoTransform,
    width: usize,
    height: usize,
) -> AuditResult<PixelWindow> {
    let corners = [
        (bounds.min_x, bounds.min_y),
        (bounds.min_x, bounds.max_y),
        (bounds.max_x, bounds.min_y),
        (bounds.max_x, bounds.max_y),
    ];

    let mut col_min = f64::INFINITY;
    let mut col_max = f64::NEG_INFINITY;
    let mut row_min = f64::INFINITY;
    let mut row_max = f64::NEG_INFINITY;
    for (x, y) in corners {
        let (col, row) = geo_transform.invert(x, y)?;
        col_min = col_min.min(col);
        col_max = col_max.max(col);
        row_min = row_min.min(row);
        row_max = row_max.max(row);
    }

    if !(col_min.is_finite() && col_max.is_finite() && row_min.is_finite() && row_max.is_finite())
    {
        return Err(AuditError::Processing(format!(
            "Boundary extent is not finite: {:?}",
            bounds
        )));
    }

    let col_start = col_min.floor().max(0.0);
    let row_start = row_min.floor().max(0.0);
    let col_stop = col_max.ceil().min(width as f64);
    let row_stop = row_max.ceil().min(height as f64);

    if col_start >= col_stop || row_start >= row_stop {
        return Err(AuditError::NoOverlap(format!(
            "extent {:?} lies outside the {}x{} grid",
            bounds, width, height
        )));
    }

    Ok(PixelWindow {
        col_off: col_start as usize,
        row_off: row_start as usize,
        width: (col_stop - col_start) as usize,
        height: (row_stop - row_start) as usize,
    })
}

/// Overwrite every pixel outside the mask with the band's nodata value (0 if unset).
pub fn apply_mask(data: &mut PixelCube, mask: &Array2<u8>, nodata: &[Option<f64>]) {
    for (band, mut plane) in data.axis_iter_mut(Axis(0)).enumerate() {
        let fill = nodata.get(band).copied().flatten().unwrap_or(0.0);
        Zip::from(&mut plane).and(mask).for_each(|value, &inside| {
            if inside == 0 {
                *value = fill;
            }
        });
    }
}

/// A raster cropped and masked to the boundary, ready to be written
#[derive(Debug, Clone)]
pub struct ClippedRaster {
    pub profile: RasterProfile,
    pub data: PixelCube,
}

#[derive(Debug)]
pub enum ClipOutcome {
    Clipped(ClippedRaster),
    /// The raster has no CRS and therefore nothing to intersect against
    MissingCrs,
}

/// Mask and crop an open dataset against a boundary already in its CRS.
pub fn clip_dataset(dataset: &Dataset, boundary: &Geometry) -> AuditResult<ClippedRaster> {
    let profile = read_profile(dataset)?;
    let window = crop_window(
        &Bounds::of(boundary),
        &profile.geo_transform,
        profile.width,
        profile.height,
    )?;
    let cropped = profile.cropped(&window);

    let mut data = read_window(dataset, &window)?;
    let mask = rasterize_mask(
        boundary,
        &cropped.geo_transform,
        &cropped.projection,
        cropped.width,
        cropped.height,
    )?;
    apply_mask(&mut data, &mask, &cropped.nodata);

    log::debug!(
        "Cropped {}x{} -> {}x{} (offset {}, {})",
        profile.width,
        profile.height,
        window.width,
        window.height,
        window.col_off,
        window.row_off
    );

    Ok(ClippedRaster {
        profile: cropped,
        data,
    })
}

/// Open one raster, fetch the boundary in its CRS from the cache and clip it.
///
/// The dataset is closed before this returns, whatever the outcome.
pub fn clip_raster<R>(path: &Path, cache: &mut ReprojectionCache<R>) -> AuditResult<ClipOutcome>
where
    R: BoundaryReprojector<Geometry = Geometry>,
{
    let dataset = Dataset::open(path)?;
    let Some(crs) = dataset_crs(&dataset) else {
        return Ok(ClipOutcome::MissingCrs);
    };

    let boundary = cache.get_or_reproject(&crs)?;
    Ok(ClipOutcome::Clipped(clip_dataset(&dataset, boundary)?))
}
