use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Point;

/// Rejected ranking input, raised before any distance is computed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("origin ({latitude}, {longitude}) is not a valid coordinate")]
    Origin { latitude: f64, longitude: f64 },

    #[error("radius must be a finite, non-negative number of kilometers, got {0}")]
    Radius(f64),
}

/// Anything that may carry a geographic location
pub trait Located {
    /// The record's location, `None` when it has none
    fn location(&self) -> Option<Point>;
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> Option<Point> {
        (**self).location()
    }
}

impl Located for Point {
    fn location(&self) -> Option<Point> {
        Some(*self)
    }
}

/// A record paired with its distance from the ranking origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Validate the ranking parameters
pub fn validate_query(origin: &Point, radius_km: f64) -> Result<(), InvalidInputError> {
    if !origin.is_valid() {
        return Err(InvalidInputError::Origin {
            latitude: origin.latitude,
            longitude: origin.longitude,
        });
    }

    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(InvalidInputError::Radius(radius_km));
    }

    Ok(())
}

/// Rank candidates by great-circle distance from `origin`
///
/// Keeps only candidates within `radius_km` (inclusive) and returns them
/// nearest first. Candidates at equal distance keep their input order.
/// Candidates without a valid location are skipped.
///
/// # Errors
/// `InvalidInputError` when the origin is not a valid coordinate or the
/// radius is negative or non-finite.
pub fn rank_nearby<T, I>(
    origin: Point,
    candidates: I,
    radius_km: f64,
) -> Result<Vec<Ranked<T>>, InvalidInputError>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    validate_query(&origin, radius_km)?;

    let mut ranked: Vec<Ranked<T>> = candidates
        .into_iter()
        .filter_map(|record| {
            let location = record.location().filter(Point::is_valid)?;
            let distance_km = origin.distance_km(&location);

            (distance_km <= radius_km).then_some(Ranked { record, distance_km })
        })
        .collect();

    // sort_by is stable, ties stay in input order
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Spot {
        id: &'static str,
        at: Option<Point>,
    }

    impl Located for Spot {
        fn location(&self) -> Option<Point> {
            self.at
        }
    }

    fn spot(id: &'static str, lat: f64, lon: f64) -> Spot {
        Spot { id, at: Some(Point::new(lat, lon)) }
    }

    fn ids<T>(ranked: &[Ranked<T>], id: impl Fn(&T) -> &'static str) -> Vec<&'static str> {
        ranked.iter().map(|r| id(&r.record)).collect()
    }

    #[test]
    fn test_sorted_nearest_first() {
        let origin = Point::new(0.0, 0.0);
        let candidates = vec![
            spot("far", 0.0, 0.05),
            spot("near", 0.0, 0.01),
            spot("mid", 0.0, 0.03),
        ];

        let ranked = rank_nearby(origin, candidates, 10.0).unwrap();
        assert_eq!(ids(&ranked, |s| s.id), vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_radius_is_inclusive_and_filters() {
        let origin = Point::new(0.0, 0.0);
        let edge = origin.distance_km(&Point::new(0.0, 1.0));
        let candidates = vec![spot("edge", 0.0, 1.0), spot("beyond", 0.0, 1.01)];

        let ranked = rank_nearby(origin, candidates, edge).unwrap();
        assert_eq!(ids(&ranked, |s| s.id), vec!["edge"]);
        assert_eq!(ranked[0].distance_km, edge);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let origin = Point::new(10.0, 10.0);
        let candidates = vec![
            spot("b", 10.0, 10.1),
            spot("a", 10.0, 10.1),
            spot("c", 10.0, 10.1),
            spot("z", 10.0, 10.0),
        ];

        let ranked = rank_nearby(origin, candidates, 50.0).unwrap();
        assert_eq!(ids(&ranked, |s| s.id), vec!["z", "b", "a", "c"]);
    }

    #[test]
    fn test_zero_radius_keeps_only_coincident() {
        let origin = Point::new(48.8566, 2.3522);
        let candidates = vec![
            spot("same", 48.8566, 2.3522),
            spot("close", 48.8567, 2.3522),
        ];

        let ranked = rank_nearby(origin, candidates, 0.0).unwrap();
        assert_eq!(ids(&ranked, |s| s.id), vec!["same"]);
        assert_eq!(ranked[0].distance_km, 0.0);
    }

    #[test]
    fn test_skips_missing_and_invalid_locations() {
        let origin = Point::new(0.0, 0.0);
        let candidates = vec![
            Spot { id: "none", at: None },
            spot("bad_lat", 95.0, 0.0),
            spot("nan", f64::NAN, 0.0),
            spot("ok", 0.0, 0.001),
        ];

        let ranked = rank_nearby(origin, candidates, 1.0).unwrap();
        assert_eq!(ids(&ranked, |s| s.id), vec!["ok"]);
    }

    #[test]
    fn test_rejects_invalid_origin() {
        let err = rank_nearby(Point::new(120.0, 0.0), Vec::<Spot>::new(), 1.0).unwrap_err();
        assert_eq!(err, InvalidInputError::Origin { latitude: 120.0, longitude: 0.0 });

        let err = rank_nearby(Point::new(0.0, f64::INFINITY), Vec::<Spot>::new(), 1.0);
        assert!(matches!(err, Err(InvalidInputError::Origin { .. })));
    }

    #[test]
    fn test_rejects_invalid_radius() {
        let origin = Point::new(0.0, 0.0);
        let err = rank_nearby(origin, vec![spot("a", 0.0, 0.0)], -1.0).unwrap_err();
        assert_eq!(err, InvalidInputError::Radius(-1.0));

        assert!(rank_nearby(origin, vec![spot("a", 0.0, 0.0)], f64::NAN).is_err());
        assert!(rank_nearby(origin, vec![spot("a", 0.0, 0.0)], f64::INFINITY).is_err());
    }

    #[test]
    fn test_borrowed_candidates_leave_input_untouched() {
        let origin = Point::new(0.0, 0.0);
        let candidates = vec![spot("b", 0.0, 0.02), spot("a", 0.0, 0.01)];
        let before = candidates.clone();

        let ranked = rank_nearby(origin, &candidates, 10.0).unwrap();
        assert_eq!(ranked[0].record.id, "a");
        assert_eq!(candidates, before);
    }

    #[test]
    fn test_ranked_serializes_flat() {
        let ranked = Ranked { record: Point::new(1.0, 2.0), distance_km: 3.5 };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "latitude": 1.0, "longitude": 2.0, "distanceKm": 3.5 })
        );
    }
}
