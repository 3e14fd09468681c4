use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Equality is exact field equality with no tolerance; beacon layouts are
/// matched against query beacons with this comparison.
///
/// # Examples
///
/// ```
/// use multilat_types::point::Point;
///
/// let a = Point::new(45.0, 45.0);
/// let b = Point::new(45.0, 45.0);
/// assert_eq!(a, b);
/// assert_ne!(a, Point::new(45.0, 45.000001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(p: Point) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(p: geo::Point<f64>) -> Self {
        Point::new(p.y(), p.x())
    }
}

/// A latitude/longitude aligned search area in degrees.
///
/// `bottom`/`top` are latitudes, `left`/`right` are longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub bottom: f64,
    pub top: f64,
    pub left: f64,
    pub right: f64,
}

impl Bounds {
    pub const fn new(bottom: f64, top: f64, left: f64, right: f64) -> Self {
        Self {
            bottom,
            top,
            left,
            right,
        }
    }

    /// Midpoint of the bounds in both axes.
    pub fn center(&self) -> Point {
        Point::new(
            (self.top + self.bottom) / 2.0,
            (self.left + self.right) / 2.0,
        )
    }

    /// Extent in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Extent in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Inclusive containment test on both axes.
    pub fn contains(&self, point: &Point) -> bool {
        (self.bottom..=self.top).contains(&point.lat) && (self.left..=self.right).contains(&point.lon)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.top, self.left)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.bottom, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_geo_round_trip_swaps_axes() {
        let p = Point::new(40.7, -74.0);
        let g: geo::Point<f64> = p.into();
        assert_eq!(g.x(), -74.0);
        assert_eq!(g.y(), 40.7);
        assert_eq!(Point::from(g), p);
    }

    #[test]
    fn test_bounds_center() {
        let b = Bounds::new(10.0, 20.0, -5.0, 5.0);
        assert_eq!(b.center(), Point::new(15.0, 0.0));
        assert_eq!(b.height(), 10.0);
        assert_eq!(b.width(), 10.0);
    }

    #[test]
    fn test_bounds_contains_edges() {
        let b = Bounds::new(0.0, 1.0, 0.0, 1.0);
        assert!(b.contains(&Point::new(0.0, 0.0)));
        assert!(b.contains(&Point::new(1.0, 1.0)));
        assert!(!b.contains(&Point::new(1.1, 0.5)));
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
    }
}
