//! Layout evaluation against simulated distance reports.
//!
//! A distance service reports, for a true position, which bucket each
//! beacon's distance falls in. Simulating those reports for many random
//! positions and multilaterating them shows how well a beacon layout and
//! bucket scheme pin positions down.

use crate::engine::Multilat;
use crate::error::{MultilatError, Result};
use crate::geometry::distance;
use crate::{Beacon, Bounds, Bucket, Centroid, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The first bucket whose `[low, high)` range contains `distance`.
///
/// # Examples
///
/// ```rust
/// use multilat::Bucket;
/// use multilat::evaluate::bucket_for;
///
/// let buckets = [Bucket::new(0.0, 500.0), Bucket::new(500.0, 1000.0)];
/// assert_eq!(bucket_for(500.0, &buckets).unwrap(), buckets[1]);
/// assert!(bucket_for(1000.0, &buckets).is_err());
/// ```
pub fn bucket_for(distance: f64, buckets: &[Bucket]) -> Result<Bucket> {
    buckets
        .iter()
        .find(|b| b.contains(distance))
        .copied()
        .ok_or(MultilatError::DistanceOutOfRange { distance })
}

/// The beacon list a distance service would report for a device at `point`.
pub fn simulate_beacons(point: &Point, layout: &[Point], buckets: &[Bucket]) -> Result<Vec<Beacon>> {
    layout
        .iter()
        .map(|beacon| {
            let range = bucket_for(distance(beacon, point), buckets)?;
            Ok(Beacon::new(*beacon, range))
        })
        .collect()
}

/// One simulated query of a grid test.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTestSample {
    /// Randomly drawn true position
    pub actual: Point,
    /// Simulated service report for `actual`
    pub beacons: Vec<Beacon>,
    pub result: Option<Centroid>,
}

impl GridTestSample {
    /// Distance from the true position to the estimate.
    pub fn offset(&self) -> Option<f64> {
        self.result.map(|c| distance(&c.point, &self.actual))
    }
}

/// Lazy sequence of grid test samples. See [`Multilat::run_grid_test`].
#[derive(Debug)]
pub struct GridTest<'a> {
    engine: &'a Multilat,
    bounds: Bounds,
    rng: StdRng,
    remaining: usize,
}

impl Iterator for GridTest<'_> {
    type Item = Result<GridTestSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let actual = Point::new(
            self.rng.gen_range(self.bounds.bottom..self.bounds.top),
            self.rng.gen_range(self.bounds.left..self.bounds.right),
        );

        let sample = simulate_beacons(&actual, self.engine.beacon_points(), self.engine.buckets())
            .and_then(|beacons| {
                let result = self.engine.multilaterate(&beacons)?;
                Ok(GridTestSample {
                    actual,
                    beacons,
                    result,
                })
            });
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for GridTest<'_> {}

impl Multilat {
    /// Multilaterate `count` uniformly random positions inside `bounds`.
    ///
    /// Positions are drawn from a generator seeded with `seed`, so a run is
    /// reproducible. Each item fails with
    /// [`DistanceOutOfRange`](MultilatError::DistanceOutOfRange) when a
    /// position is farther from some beacon than the last bucket reaches.
    pub fn run_grid_test(&self, bounds: Bounds, count: usize, seed: u64) -> Result<GridTest<'_>> {
        crate::compute::validation::validate_bounds(&bounds)?;

        log::debug!(
            "grid test: {} points in [{}, {}] x [{}, {}], seed {}",
            count,
            bounds.bottom,
            bounds.top,
            bounds.left,
            bounds.right,
            seed
        );

        Ok(GridTest {
            engine: self,
            bounds,
            rng: StdRng::seed_from_u64(seed),
            remaining: count,
        })
    }
}

/// Summary of error radii over a set of query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    /// Largest error radius among solved queries
    pub max_error: f64,
    /// Mean error radius among solved queries, 0 when none were solved
    pub avg_error: f64,
    pub total_count: usize,
    /// Queries with no solution
    pub null_count: usize,
}

impl ErrorStats {
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Option<Centroid>>,
    {
        let mut stats = Self::default();
        let mut sum = 0.0;

        for result in results {
            stats.total_count += 1;
            match result {
                Some(c) => {
                    sum += c.err;
                    stats.max_error = stats.max_error.max(c.err);
                }
                None => stats.null_count += 1,
            }
        }

        let solved = stats.total_count - stats.null_count;
        if solved > 0 {
            stats.avg_error = sum / solved as f64;
        }
        stats
    }

    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a GridTestSample>,
    {
        Self::from_results(samples.into_iter().map(|s| s.result))
    }

    pub fn solved_count(&self) -> usize {
        self.total_count - self.null_count
    }
}
