use crate::types::{AuditError, AuditResult, Crs};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Produces the study-area geometry expressed in a target CRS
pub trait BoundaryReprojector {
    type Geometry;

    fn reproject_to(&self, target: &Crs) -> AuditResult<Self::Geometry>;
}

/// Lazily filled map from CRS name to reprojected boundary.
///
/// Each distinct CRS name is reprojected at most once per run. A failed
/// reprojection is remembered as well, so later rasters in that CRS fail fast
/// instead of recomputing.
pub struct ReprojectionCache<R: BoundaryReprojector> {
    reprojector: R,
    entries: HashMap<String, Result<R::Geometry, String>>,
}

impl<R: BoundaryReprojector> ReprojectionCache<R> {
    pub fn new(reprojector: R) -> Self {
        Self {
            reprojector,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_reproject(&mut self, target: &Crs) -> AuditResult<&R::Geometry> {
        let entry = match self.entries.entry(target.name.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                log::info!("Reprojecting boundary to {}", target.name);
                let computed = self
                    .reprojector
                    .reproject_to(target)
                    .map_err(|e| e.to_string());
                if let Err(message) = &computed {
                    log::warn!("Boundary reprojection to {} failed: {}", target.name, message);
                }
                entry.insert(computed)
            }
        };

        entry.as_ref().map_err(|message| {
            AuditError::Processing(format!(
                "Boundary could not be reprojected to {}: {}",
                target.name, message
            ))
        })
    }

    /// Number of distinct CRSs reprojected so far (successful or not)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, crs_name: &str) -> bool {
        self.entries.contains_key(crs_name)
    }

    pub fn reprojector(&self) -> &R {
        &self.reprojector
    }
}
