//! Error types for engine construction and queries.
//!
//! Validation failures describe caller mistakes and are returned before any
//! search work runs. An empty intersection is not an error: queries report
//! it as `Ok(None)`.

use crate::{Bucket, Point};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MultilatError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MultilatError {
    /// The query supplied a different number of beacons than the engine was built with.
    #[error("wrong number of beacons: expected {expected}, got {actual}")]
    WrongBeaconCount { expected: usize, actual: usize },

    /// A configured beacon point has no counterpart in the query.
    #[error(
        "beacon set differs from the configured layout: no beacon at ({}, {}) (configured index {index})",
        .point.lat,
        .point.lon
    )]
    UnknownBeaconSet { index: usize, point: Point },

    /// A beacon declared a range that is not one of the configured buckets.
    #[error(
        "beacon {beacon_index} at ({}, {}) has range [{}, {}) which is not a configured bucket",
        .point.lat,
        .point.lon,
        .range.low,
        .range.high
    )]
    UnmatchedBucketRange {
        beacon_index: usize,
        point: Point,
        range: Bucket,
    },

    #[error("invalid bucket {index}: [{low}, {high}) must be finite with low < high")]
    InvalidBucket { index: usize, low: f64, high: f64 },

    #[error("bucket list is empty")]
    EmptyBucketList,

    #[error("beacon layout is empty")]
    EmptyBeaconLayout,

    #[error("grid needs at least 4 points (2x2), requested {requested}")]
    GridTooSmall { requested: usize },

    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// A true distance fell outside every configured bucket.
    #[error("distance {distance}m is not covered by any bucket")]
    DistanceOutOfRange { distance: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl MultilatError {
    /// Whether this error came from validating a query against the engine layout.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MultilatError::WrongBeaconCount { .. }
                | MultilatError::UnknownBeaconSet { .. }
                | MultilatError::UnmatchedBucketRange { .. }
        )
    }
}
