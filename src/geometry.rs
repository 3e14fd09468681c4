//! Geometry kernel built on the `geo` crate.
//!
//! Distances are great-circle (haversine) distances in meters on a sphere of
//! mean Earth radius. Bearings are in degrees clockwise from north.

use crate::error::{MultilatError, Result};
use crate::{Beacon, Bounds, Point};
use geo::{Destination, Distance, Haversine};

/// Great-circle distance between two points in meters.
///
/// # Examples
///
/// ```rust
/// use multilat::{Point, geometry::distance};
///
/// let a = Point::new(45.0, 45.0);
/// let b = Point::new(45.0, 45.01);
/// let d = distance(&a, &b);
/// assert!(d > 780.0 && d < 790.0);
/// ```
#[inline]
pub fn distance(a: &Point, b: &Point) -> f64 {
    Haversine.distance(geo::Point::from(*a), geo::Point::from(*b))
}

/// The point reached by travelling `meters` from `origin` along `bearing` degrees.
///
/// # Examples
///
/// ```rust
/// use multilat::{Point, geometry::{destination, distance}};
///
/// let origin = Point::new(45.0, 45.0);
/// let north = destination(&origin, 0.0, 1000.0);
/// assert!(north.lat > origin.lat);
/// assert!((distance(&origin, &north) - 1000.0).abs() < 1e-6);
/// ```
pub fn destination(origin: &Point, bearing: f64, meters: f64) -> Point {
    Haversine
        .destination(geo::Point::from(*origin), bearing, meters)
        .into()
}

/// Bounds whose edges lie `radius` meters north, east, south and west of `center`.
///
/// # Examples
///
/// ```rust
/// use multilat::{Point, geometry::bounds_from_center};
///
/// let bounds = bounds_from_center(&Point::new(45.0, 45.0), 5000.0);
/// assert!(bounds.bottom < 45.0 && bounds.top > 45.0);
/// assert!(bounds.left < 45.0 && bounds.right > 45.0);
/// ```
pub fn bounds_from_center(center: &Point, radius: f64) -> Bounds {
    let top = destination(center, 0.0, radius);
    let right = destination(center, 90.0, radius);
    let bottom = destination(center, 180.0, radius);
    let left = destination(center, 270.0, radius);

    Bounds::new(bottom.lat, top.lat, left.lon, right.lon)
}

/// Great-circle length of the bounds' top-left to bottom-right diagonal.
pub fn bounds_diagonal(bounds: &Bounds) -> f64 {
    distance(&bounds.top_left(), &bounds.bottom_right())
}

/// Search bounds covering every beacon's possible positions.
///
/// Each beacon contributes a box reaching `range.high * margin` meters in
/// every direction; the result is the union of those boxes.
pub fn bounds_around_beacons(beacons: &[Beacon], margin: f64) -> Result<Bounds> {
    if !margin.is_finite() || margin <= 0.0 {
        return Err(MultilatError::InvalidInput(format!(
            "margin must be positive and finite, got: {}",
            margin
        )));
    }

    let mut iter = beacons
        .iter()
        .map(|b| bounds_from_center(&b.point, b.range.high * margin));

    let first = iter.next().ok_or(MultilatError::EmptyBeaconLayout)?;
    Ok(iter.fold(first, |acc, b| {
        Bounds::new(
            acc.bottom.min(b.bottom),
            acc.top.max(b.top),
            acc.left.min(b.left),
            acc.right.max(b.right),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bucket;

    #[test]
    fn test_distance_is_symmetric_and_zero_on_self() {
        let a = Point::new(45.0, 45.0);
        let b = Point::new(45.02, 44.97);
        assert_eq!(distance(&a, &a), 0.0);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn test_destination_round_trip_distance() {
        let origin = Point::new(45.0, 45.0);
        for bearing in [0.0, 45.0, 120.0, 240.0, 300.0] {
            let p = destination(&origin, bearing, 1300.0);
            assert!((distance(&origin, &p) - 1300.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bounds_from_center_is_centered() {
        let center = Point::new(45.0, 45.0);
        let bounds = bounds_from_center(&center, 10_000.0);
        let c = bounds.center();
        assert!((c.lat - center.lat).abs() < 1e-3);
        assert!((c.lon - center.lon).abs() < 1e-6);
        assert!((distance(&center, &Point::new(bounds.top, 45.0)) - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_diagonal() {
        let bounds = bounds_from_center(&Point::new(45.0, 45.0), 10_000.0);
        let diag = bounds_diagonal(&bounds);
        // A 20km square has a ~28.3km diagonal
        assert!(diag > 28_000.0 && diag < 28_600.0);
    }

    #[test]
    fn test_bounds_around_beacons() {
        let beacons = [
            Beacon::new(Point::new(45.0, 45.0), Bucket::new(0.0, 500.0)),
            Beacon::new(Point::new(45.1, 45.1), Bucket::new(1000.0, 2000.0)),
        ];
        let bounds = bounds_around_beacons(&beacons, 1.5).unwrap();
        assert!(bounds.contains(&beacons[0].point));
        assert!(bounds.contains(&beacons[1].point));
        let north = destination(&beacons[1].point, 0.0, 3000.0);
        assert!((bounds.top - north.lat).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_around_beacons_rejects_empty() {
        assert_eq!(
            bounds_around_beacons(&[], 1.5),
            Err(MultilatError::EmptyBeaconLayout)
        );
    }
}
