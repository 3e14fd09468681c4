//! Reduce a candidate point set to a position estimate.
//!
//! The mean is taken component-wise over latitude and longitude. This is not
//! a geodesic average and drifts near the poles and across the antimeridian;
//! within a small search area the difference is negligible.

use crate::geometry::distance;
use crate::{Centroid, Point};

/// Component-wise arithmetic mean of `points`, or `None` when empty.
pub fn mean_point(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    let n = points.len() as f64;

    Some(Point::new(lat / n, lon / n))
}

/// Largest great-circle distance from `from` to any of `points`.
pub fn max_distance(from: &Point, points: &[Point]) -> f64 {
    points
        .iter()
        .map(|p| distance(from, p))
        .fold(0.0, f64::max)
}

/// The centroid of `points` with its worst-case error radius.
///
/// Returns `None` for an empty set: no position satisfies the query.
///
/// # Examples
///
/// ```rust
/// use multilat::Point;
/// use multilat::compute::centroid::estimate;
///
/// assert!(estimate(&[]).is_none());
///
/// let c = estimate(&[Point::new(45.0, 45.0), Point::new(45.0, 45.02)]).unwrap();
/// assert_eq!(c.point.lat, 45.0);
/// assert!((c.point.lon - 45.01).abs() < 1e-12);
/// assert!(c.err > 780.0 && c.err < 790.0);
/// ```
pub fn estimate(points: &[Point]) -> Option<Centroid> {
    let center = mean_point(points)?;
    let err = max_distance(&center, points);
    Some(Centroid::new(center, err))
}
