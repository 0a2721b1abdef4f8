use crate::models::BoundingBox;

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two coordinates in degrees
///
/// Symmetric, and zero for identical points. Inputs are assumed to be
/// valid coordinates; callers validate before ranking.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let half_dphi = (lat2 - lat1).to_radians() / 2.0;
    let half_dlambda = (lon2 - lon1).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
    // Rounding can push `h` just past 1 for near-antipodal pairs
    let h = h.min(1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Degree window enclosing every point within `radius_km` of a center
///
/// Used to narrow the user directory query to a latitude band before
/// the exact haversine filter. Latitude bounds are clamped to the poles;
/// longitude bounds are left unwrapped.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    const KM_PER_DEGREE: f64 = 111.0;

    let lat_span = radius_km / KM_PER_DEGREE;
    // Meridians converge toward the poles
    let lon_span = radius_km / (KM_PER_DEGREE * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: (lat - lat_span).max(-90.0),
        max_lat: (lat + lat_span).min(90.0),
        min_lon: lon - lon_span,
        max_lon: lon + lon_span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_london_to_paris() {
        let km = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((km - 343.5).abs() < 1.0, "got {}", km);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let km = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((km - 111.19).abs() < 0.5, "got {}", km);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let km = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!(km.is_finite());
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_spans_radius() {
        let bbox = calculate_bounding_box(40.7128, -74.0060, 10.0);

        assert!(bbox.min_lat < 40.7128 && 40.7128 < bbox.max_lat);
        assert!(bbox.min_lon < -74.0060 && -74.0060 < bbox.max_lon);
        // 2 * 10km at 111km per degree
        assert!((bbox.max_lat - bbox.min_lat - 0.18).abs() < 0.01);
        // Longitude degrees are shorter away from the equator
        assert!(bbox.max_lon - bbox.min_lon > bbox.max_lat - bbox.min_lat);
    }

    #[test]
    fn test_bounding_box_clamps_latitude() {
        let bbox = calculate_bounding_box(89.9, 0.0, 100.0);
        assert_eq!(bbox.max_lat, 90.0);

        let bbox = calculate_bounding_box(-89.9, 0.0, 100.0);
        assert_eq!(bbox.min_lat, -90.0);
    }
}
