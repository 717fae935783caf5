//! Human-readable labels for pixel sizes.
//!
//! Resolutions are converted to meters (degrees are approximated with a
//! constant length per degree) and snapped to the nearest well-known product
//! tier. Tiers are tested in ascending order and the first window that
//! contains the value wins, so overlapping windows resolve to the smaller
//! tier and values between windows are reported raw.

use crate::types::{CrsKind, Resolution};

/// Approximate ground length of one degree, in kilometers
pub const KM_PER_DEGREE: f64 = 111.32;

/// A named resolution tier: values strictly within `tolerance` of `center` match
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub label: &'static str,
    pub center: f64,
    pub tolerance: f64,
}

/// Tested in this order; the order is part of the contract.
pub const TIERS: [Tier; 7] = [
    Tier { label: "30 m", center: 30.0, tolerance: 5.0 },
    Tier { label: "100 m", center: 100.0, tolerance: 20.0 },
    Tier { label: "250 m", center: 250.0, tolerance: 50.0 },
    Tier { label: "500 m", center: 500.0, tolerance: 80.0 },
    Tier { label: "1 km", center: 1000.0, tolerance: 200.0 },
    Tier { label: "5 km", center: 5000.0, tolerance: 500.0 },
    Tier { label: "10 km", center: 10000.0, tolerance: 1000.0 },
];

/// Label one axis given in meters
pub fn classify_meters(value_m: f64) -> String {
    let v = value_m.abs();
    if let Some(tier) = TIERS.iter().find(|t| (v - t.center).abs() < t.tolerance) {
        return tier.label.to_string();
    }

    if v < 1000.0 {
        format!("{:.1} m", v)
    } else {
        format!("{:.2} km", v / 1000.0)
    }
}

/// Per-axis size in meters, or `None` when the CRS units are unknown
pub fn to_meters(resolution: Resolution, kind: CrsKind) -> Option<(f64, f64)> {
    match kind {
        CrsKind::Projected => Some((resolution.x, resolution.y)),
        CrsKind::Geographic => {
            let m_per_deg = KM_PER_DEGREE * 1000.0;
            Some((resolution.x * m_per_deg, resolution.y * m_per_deg))
        }
        CrsKind::Unknown => None,
    }
}

/// `"<x-label> x <y-label>"`, or the raw pair when the CRS kind is unknown
pub fn describe_resolution(resolution: Resolution, kind: CrsKind) -> String {
    match to_meters(resolution, kind) {
        Some((x_m, y_m)) => format!("{} x {}", classify_meters(x_m), classify_meters(y_m)),
        None => format!("{:?} x {:?} (units of CRS)", resolution.x, resolution.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_tiers() {
        assert_eq!(classify_meters(30.0), "30 m");
        assert_eq!(classify_meters(27.0), "30 m");
        assert_eq!(classify_meters(90.0), "100 m");
        assert_eq!(classify_meters(231.66), "250 m");
        assert_eq!(classify_meters(463.3), "500 m");
        assert_eq!(classify_meters(1000.0), "1 km");
        assert_eq!(classify_meters(5000.0), "5 km");
        assert_eq!(classify_meters(9500.0), "10 km");
    }

    #[test]
    fn test_raw_fallback() {
        assert_eq!(classify_meters(12.0), "12.0 m");
        assert_eq!(classify_meters(15000.0), "15.00 km");
        assert_eq!(classify_meters(-12.0), "12.0 m");
    }

    #[test]
    fn test_window_edges_are_exclusive() {
        assert_eq!(classify_meters(25.0), "25.0 m");
        assert_eq!(classify_meters(35.0), "35.0 m");
        assert_eq!(classify_meters(25.5), "30 m");
    }

    #[test]
    fn test_gaps_between_tiers_report_raw() {
        // Between 100 +/- 20 and 250 +/- 50
        assert_eq!(classify_meters(180.0), "180.0 m");
        // Between 1 km +/- 200 and 5 km +/- 500
        assert_eq!(classify_meters(2500.0), "2.50 km");
    }

    #[test]
    fn test_tier_centers_map_to_their_labels() {
        for tier in TIERS.iter() {
            assert_eq!(classify_meters(tier.center), tier.label);
        }
        assert_eq!(classify_meters(290.0), "250 m");
    }

    #[test]
    fn test_geographic_degrees_are_converted() {
        let label = describe_resolution(Resolution::new(0.0089, 0.0089), CrsKind::Geographic);
        assert_eq!(label, "1 km x 1 km");

        let label = describe_resolution(
            Resolution::new(0.000_269_494_585, 0.000_269_494_585),
            CrsKind::Geographic,
        );
        assert_eq!(label, "30 m x 30 m");
    }

    #[test]
    fn test_projected_axes_classified_independently() {
        let label = describe_resolution(Resolution::new(30.0, 1000.0), CrsKind::Projected);
        assert_eq!(label, "30 m x 1 km");
    }

    #[test]
    fn test_unknown_crs_reports_raw_units() {
        let label = describe_resolution(Resolution::new(1000.0, 0.0089), CrsKind::Unknown);
        assert_eq!(label, "1000.0 x 0.0089 (units of CRS)");
    }
}
