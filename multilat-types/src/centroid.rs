use crate::point::Point;
use serde::{Deserialize, Serialize};

/// A position estimate with a worst-case error radius.
///
/// `point` is the component-wise arithmetic mean of a candidate point set
/// and `err` is the largest great-circle distance, in meters, from `point`
/// to any member of that set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub point: Point,
    #[serde(rename = "error")]
    pub err: f64,
}

impl Centroid {
    pub const fn new(point: Point, err: f64) -> Self {
        Self { point, err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_new() {
        let c = Centroid::new(Point::new(1.0, 2.0), 3.5);
        assert_eq!(c.point, Point::new(1.0, 2.0));
        assert_eq!(c.err, 3.5);
    }
}
