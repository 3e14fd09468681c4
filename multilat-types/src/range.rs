use crate::point::Point;
use serde::{Deserialize, Serialize};

/// A half-open distance range `[low, high)` in meters.
///
/// Buckets are supplied by whatever service coarsens true distances before
/// they reach the engine. A valid bucket has finite endpoints and
/// `low < high`; the engine rejects invalid buckets when it is constructed.
///
/// # Examples
///
/// ```
/// use multilat_types::range::Bucket;
///
/// let bucket = Bucket::new(1000.0, 2000.0);
/// assert!(bucket.contains(1000.0));
/// assert!(!bucket.contains(2000.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Inclusive lower limit in meters
    pub low: f64,
    /// Exclusive upper limit in meters
    pub high: f64,
}

impl Bucket {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `distance` falls in `[low, high)`.
    #[inline]
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.low && distance < self.high
    }

    /// Finite endpoints with `low < high`.
    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low < self.high
    }

    /// Whether two buckets share any distance.
    pub fn overlaps(&self, other: &Bucket) -> bool {
        self.low < other.high && other.low < self.high
    }
}

impl From<(f64, f64)> for Bucket {
    fn from((low, high): (f64, f64)) -> Self {
        Bucket::new(low, high)
    }
}

/// A reference point together with the bucketed distance measured to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub point: Point,
    pub range: Bucket,
}

impl Beacon {
    pub const fn new(point: Point, range: Bucket) -> Self {
        Self { point, range }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_is_half_open() {
        let b = Bucket::new(500.0, 1000.0);
        assert!(!b.contains(499.999));
        assert!(b.contains(500.0));
        assert!(b.contains(999.999));
        assert!(!b.contains(1000.0));
    }

    #[test]
    fn test_bucket_validity() {
        assert!(Bucket::new(0.0, 1.0).is_valid());
        assert!(!Bucket::new(1.0, 1.0).is_valid());
        assert!(!Bucket::new(2.0, 1.0).is_valid());
        assert!(!Bucket::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_bucket_overlap() {
        let a = Bucket::new(0.0, 500.0);
        assert!(!a.overlaps(&Bucket::new(500.0, 1000.0)));
        assert!(a.overlaps(&Bucket::new(499.0, 1000.0)));
    }

    #[test]
    fn test_bucket_from_tuple() {
        let b: Bucket = (1000.0, 2000.0).into();
        assert_eq!(b, Bucket::new(1000.0, 2000.0));
    }
}
