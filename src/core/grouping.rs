//! Per-folder bucketing of rasters by CRS and by exact pixel size.

use crate::types::{Crs, CrsKind, RasterRecord, Resolution};
use serde::Serialize;
use std::collections::HashMap;

/// Files sharing one normalized CRS string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrsGroup {
    pub crs: Crs,
    pub files: Vec<String>,
}

/// Files sharing one bit-identical resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionGroup {
    pub resolution: Resolution,
    /// Kind of the first CRS seen among the group's files; drives unit conversion
    pub crs_kind: CrsKind,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FolderGroups {
    pub crs_groups: Vec<CrsGroup>,
    /// Files that opened but carry no CRS, in discovery order
    pub missing_crs: Vec<String>,
    pub resolution_groups: Vec<ResolutionGroup>,
}

impl FolderGroups {
    /// No missing CRS, one CRS, one resolution
    pub fn is_consistent(&self) -> bool {
        self.missing_crs.is_empty()
            && self.crs_groups.len() == 1
            && self.resolution_groups.len() == 1
    }
}

/// Group the opened records of one folder. Failed records are ignored here.
///
/// Groups appear in first-encountered order and files keep discovery order
/// inside each group.
pub fn group_records(records: &[RasterRecord]) -> FolderGroups {
    let mut groups = FolderGroups::default();
    let mut crs_index: HashMap<String, usize> = HashMap::new();
    let mut res_index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut kind_decided: Vec<bool> = Vec::new();

    for record in records {
        let Some(resolution) = record.resolution() else {
            continue;
        };
        let file = record.file_name();

        match record.crs() {
            Some(crs) => {
                let idx = *crs_index.entry(crs.name.clone()).or_insert_with(|| {
                    groups.crs_groups.push(CrsGroup {
                        crs: crs.clone(),
                        files: Vec::new(),
                    });
                    groups.crs_groups.len() - 1
                });
                groups.crs_groups[idx].files.push(file.clone());
            }
            None => groups.missing_crs.push(file.clone()),
        }

        let idx = *res_index.entry(resolution.key()).or_insert_with(|| {
            groups.resolution_groups.push(ResolutionGroup {
                resolution,
                crs_kind: CrsKind::Unknown,
                files: Vec::new(),
            });
            kind_decided.push(false);
            groups.resolution_groups.len() - 1
        });
        // First CRS-bearing member decides, even if CRS-less files came first
        if let (false, Some(crs)) = (kind_decided[idx], record.crs()) {
            groups.resolution_groups[idx].crs_kind = crs.kind;
            kind_decided[idx] = true;
        }
        groups.resolution_groups[idx].files.push(file);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm() -> Crs {
        Crs::new("EPSG:32634", "", CrsKind::Projected)
    }

    fn wgs84() -> Crs {
        Crs::new("EPSG:4326", "", CrsKind::Geographic)
    }

    #[test]
    fn test_same_crs_same_group_different_crs_different_group() {
        let records = vec![
            RasterRecord::opened("d/a.tif", Some(utm()), Resolution::new(1000.0, 1000.0)),
            RasterRecord::opened("d/b.tif", Some(wgs84()), Resolution::new(0.0089, 0.0089)),
            RasterRecord::opened("d/c.tif", Some(utm()), Resolution::new(1000.0, 1000.0)),
        ];
        let groups = group_records(&records);

        assert_eq!(groups.crs_groups.len(), 2);
        assert_eq!(groups.crs_groups[0].crs.name, "EPSG:32634");
        assert_eq!(groups.crs_groups[0].files, vec!["a.tif", "c.tif"]);
        assert_eq!(groups.crs_groups[1].crs.name, "EPSG:4326");
        assert_eq!(groups.crs_groups[1].files, vec!["b.tif"]);

        assert_eq!(groups.resolution_groups.len(), 2);
        assert_eq!(groups.resolution_groups[0].files, vec!["a.tif", "c.tif"]);
        assert_eq!(groups.resolution_groups[0].crs_kind, CrsKind::Projected);
        assert_eq!(groups.resolution_groups[1].crs_kind, CrsKind::Geographic);
        assert!(!groups.is_consistent());
    }

    #[test]
    fn test_no_tolerance_when_grouping_resolutions() {
        let records = vec![
            RasterRecord::opened("a.tif", Some(utm()), Resolution::new(30.0, 30.0)),
            RasterRecord::opened("b.tif", Some(utm()), Resolution::new(30.000000001, 30.0)),
        ];
        let groups = group_records(&records);
        assert_eq!(groups.crs_groups.len(), 1);
        assert_eq!(groups.resolution_groups.len(), 2);
    }

    #[test]
    fn test_missing_crs_and_failures() {
        let records = vec![
            RasterRecord::opened("nocrs.tif", None, Resolution::new(30.0, 30.0)),
            RasterRecord::failed("broken.tif", "not a raster"),
            RasterRecord::opened("a.tif", Some(utm()), Resolution::new(30.0, 30.0)),
            RasterRecord::opened("b.tif", Some(utm()), Resolution::new(30.0, 30.0)),
        ];
        let groups = group_records(&records);

        assert_eq!(groups.missing_crs, vec!["nocrs.tif"]);
        assert_eq!(groups.crs_groups.len(), 1);
        assert_eq!(groups.crs_groups[0].files, vec!["a.tif", "b.tif"]);
        assert_eq!(groups.resolution_groups.len(), 1);
        assert_eq!(
            groups.resolution_groups[0].files,
            vec!["nocrs.tif", "a.tif", "b.tif"]
        );
        // The CRS-less file came first, but the group still converts as projected
        assert_eq!(groups.resolution_groups[0].crs_kind, CrsKind::Projected);
        assert!(!groups.is_consistent());
    }

    #[test]
    fn test_consistent_folder() {
        let records = vec![
            RasterRecord::opened("a.tif", Some(utm()), Resolution::new(30.0, 30.0)),
            RasterRecord::opened("b.tif", Some(utm()), Resolution::new(30.0, 30.0)),
        ];
        assert!(group_records(&records).is_consistent());
    }
}
