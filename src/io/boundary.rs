use crate::core::reprojection_cache::BoundaryReprojector;
use crate::io::raster::spatial_ref_from_wkt;
use crate::types::{AuditError, AuditResult, Crs};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::vector::{Geometry, LayerAccess};
use gdal::Dataset;
use std::path::{Path, PathBuf};

/// Study-area boundary: every polygon of the first layer merged into one geometry
pub struct Boundary {
    path: PathBuf,
    geometry: Geometry,
    srs: SpatialRef,
    part_count: usize,
}

impl Boundary {
    /// Load the boundary once. A boundary without a CRS is refused outright,
    /// since it cannot be placed in any raster's coordinate frame.
    pub fn load<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let path = path.as_ref();
        log::info!("Loading boundary from: {}", path.display());

        let dataset = Dataset::open(path)?;
        let mut layer = dataset.layer(0)?;

        let srs = layer
            .spatial_ref()
            .ok_or_else(|| AuditError::MissingBoundaryCrs(path.display().to_string()))?;
        srs.set_axis_mapping_strategy(gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER);

        let mut merged: Option<Geometry> = None;
        let mut part_count = 0;
        for feature in layer.features() {
            let Some(geometry) = feature.geometry() else {
                continue;
            };
            part_count += 1;
            merged = Some(match merged {
                None => geometry.clone(),
                Some(acc) => acc.union(geometry).ok_or_else(|| {
                    AuditError::Processing(format!(
                        "Union of boundary parts failed at feature {}",
                        part_count
                    ))
                })?,
            });
        }

        let geometry =
            merged.ok_or_else(|| AuditError::EmptyBoundary(path.display().to_string()))?;

        log::info!(
            "Boundary loaded: {} part(s), CRS {}",
            part_count,
            srs.auth_code()
                .map(|code| format!("EPSG:{}", code))
                .unwrap_or_else(|_| "<custom>".to_string())
        );

        Ok(Self {
            path: path.to_path_buf(),
            geometry,
            srs,
            part_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merged geometry in the boundary's own CRS
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn spatial_ref(&self) -> &SpatialRef {
        &self.srs
    }

    pub fn part_count(&self) -> usize {
        self.part_count
    }
}

impl BoundaryReprojector for Boundary {
    type Geometry = Geometry;

    fn reproject_to(&self, target: &Crs) -> AuditResult<Geometry> {
        let target_srs = spatial_ref_from_wkt(&target.wkt)?;
        let transform = CoordTransform::new(&self.srs, &target_srs)?;
        Ok(self.geometry.transform(&transform)?)
    }
}
