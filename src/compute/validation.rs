//! Validation for configuration inputs and queries.
//!
//! Construction inputs (bounds, beacon points, buckets) are checked once when
//! an engine is built. Every query is then checked against the layout the
//! engine was built with, in three stages:
//!
//! 1. the beacon count must match the configured count,
//! 2. the beacon points must match the configured points (reordering the
//!    query into configured order if needed),
//! 3. every declared range must equal one configured bucket.
//!
//! The first failing stage rejects the query; nothing is searched or cached.

use crate::cache::BucketKey;
use crate::error::{MultilatError, Result};
use crate::{Beacon, Bounds, Bucket, Point};

/// Validates a point has valid latitude and longitude.
///
/// Latitude: [-90.0, 90.0], Longitude: [-180.0, 180.0]
///
/// # Examples
///
/// ```
/// use multilat::Point;
/// use multilat::compute::validation::validate_geographic_point;
///
/// assert!(validate_geographic_point(&Point::new(45.0, 45.0)).is_ok());
/// assert!(validate_geographic_point(&Point::new(95.0, 45.0)).is_err());
/// assert!(validate_geographic_point(&Point::new(45.0, 200.0)).is_err());
/// ```
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    if !point.lat.is_finite() {
        return Err(MultilatError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            point.lat
        )));
    }

    if !point.lon.is_finite() {
        return Err(MultilatError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            point.lon
        )));
    }

    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(MultilatError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            point.lat
        )));
    }

    if !(-180.0..=180.0).contains(&point.lon) {
        return Err(MultilatError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            point.lon
        )));
    }

    Ok(())
}

/// Validates multiple points.
pub fn validate_points(points: &[Point]) -> Result<()> {
    for (idx, point) in points.iter().enumerate() {
        validate_geographic_point(point)
            .map_err(|e| MultilatError::InvalidInput(format!("Point at index {}: {}", idx, e)))?;
    }
    Ok(())
}

/// Validates search bounds: finite, geographic, and non-degenerate.
///
/// Bounds crossing the antimeridian (`left > right`) are not supported.
pub fn validate_bounds(bounds: &Bounds) -> Result<()> {
    for corner in [bounds.top_left(), bounds.bottom_right()] {
        validate_geographic_point(&corner).map_err(|e| MultilatError::InvalidBounds(e.to_string()))?;
    }

    if bounds.bottom >= bounds.top {
        return Err(MultilatError::InvalidBounds(format!(
            "bottom ({}) must be < top ({})",
            bounds.bottom, bounds.top
        )));
    }

    if bounds.left >= bounds.right {
        return Err(MultilatError::InvalidBounds(format!(
            "left ({}) must be < right ({})",
            bounds.left, bounds.right
        )));
    }

    Ok(())
}

/// Validates a bucket scheme.
///
/// Every bucket needs finite endpoints with `low < high`. Overlapping buckets
/// are accepted but logged, since a distance in the overlap is attributed to
/// the first matching bucket only.
pub fn validate_buckets(buckets: &[Bucket]) -> Result<()> {
    if buckets.is_empty() {
        return Err(MultilatError::EmptyBucketList);
    }

    for (index, bucket) in buckets.iter().enumerate() {
        if !bucket.is_valid() {
            return Err(MultilatError::InvalidBucket {
                index,
                low: bucket.low,
                high: bucket.high,
            });
        }
    }

    for (i, a) in buckets.iter().enumerate() {
        for (j, b) in buckets.iter().enumerate().skip(i + 1) {
            if a.overlaps(b) {
                log::warn!(
                    "buckets {} [{}, {}) and {} [{}, {}) overlap",
                    i,
                    a.low,
                    a.high,
                    j,
                    b.low,
                    b.high
                );
            }
        }
    }

    Ok(())
}

/// A query that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    /// Query beacons in the engine's configured order
    pub beacons: Vec<Beacon>,
    /// Bucket index selected by each beacon, in configured order
    pub key: BucketKey,
    /// Whether the query had to be reordered to match the layout
    pub reordered: bool,
}

/// Validate `beacons` against the configured `layout` and `buckets`.
///
/// # Examples
///
/// ```
/// use multilat::{Beacon, Bucket, MultilatError, Point};
/// use multilat::compute::validation::validate_query;
///
/// let layout = [Point::new(45.0, 45.0), Point::new(45.01, 45.0)];
/// let buckets = [Bucket::new(0.0, 500.0), Bucket::new(500.0, 1000.0)];
///
/// // Supplied out of order: reordered to the layout's order
/// let beacons = [
///     Beacon::new(layout[1], buckets[0]),
///     Beacon::new(layout[0], buckets[1]),
/// ];
/// let query = validate_query(&layout, &buckets, &beacons).unwrap();
/// assert!(query.reordered);
/// assert_eq!(query.key.as_slice(), &[1, 0]);
///
/// let err = validate_query(&layout, &buckets, &beacons[..1]).unwrap_err();
/// assert_eq!(err, MultilatError::WrongBeaconCount { expected: 2, actual: 1 });
/// ```
pub fn validate_query(
    layout: &[Point],
    buckets: &[Bucket],
    beacons: &[Beacon],
) -> Result<ValidatedQuery> {
    check_count(layout, beacons)?;
    let (beacons, reordered) = match_identity(layout, beacons)?;
    let key = match_buckets(buckets, &beacons)?;

    Ok(ValidatedQuery {
        beacons,
        key,
        reordered,
    })
}

fn check_count(layout: &[Point], beacons: &[Beacon]) -> Result<()> {
    if beacons.len() != layout.len() {
        return Err(MultilatError::WrongBeaconCount {
            expected: layout.len(),
            actual: beacons.len(),
        });
    }
    Ok(())
}

fn points_match(layout: &[Point], beacons: &[Beacon]) -> bool {
    layout.iter().zip(beacons).all(|(p, b)| *p == b.point)
}

/// Returns the beacons in layout order, reordering when the given order differs.
///
/// Each query beacon is consumed at most once, so a query that repeats one
/// beacon in place of another does not match.
fn match_identity(layout: &[Point], beacons: &[Beacon]) -> Result<(Vec<Beacon>, bool)> {
    if points_match(layout, beacons) {
        return Ok((beacons.to_vec(), false));
    }

    let mut used = vec![false; beacons.len()];
    let mut ordered = Vec::with_capacity(layout.len());

    for (index, point) in layout.iter().enumerate() {
        let found = beacons
            .iter()
            .enumerate()
            .find(|(i, b)| !used[*i] && b.point == *point);

        match found {
            Some((i, beacon)) => {
                used[i] = true;
                ordered.push(*beacon);
            }
            None => {
                return Err(MultilatError::UnknownBeaconSet {
                    index,
                    point: *point,
                });
            }
        }
    }

    Ok((ordered, true))
}

fn match_buckets(buckets: &[Bucket], beacons: &[Beacon]) -> Result<BucketKey> {
    beacons
        .iter()
        .enumerate()
        .map(|(beacon_index, beacon)| {
            buckets
                .iter()
                .position(|bucket| *bucket == beacon.range)
                .ok_or(MultilatError::UnmatchedBucketRange {
                    beacon_index,
                    point: beacon.point,
                    range: beacon.range,
                })
        })
        .collect()
}
