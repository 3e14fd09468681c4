//! The multilateration engine.
//!
//! A [`Multilat`] is built once for a fixed search area, beacon layout and
//! bucket scheme. Construction lays out the candidate grid and indexes every
//! grid point by the bucket its distance to each beacon falls in; queries then
//! only intersect precomputed sets, and memoize the outcome per bucket
//! selection.

use crate::cache::{CacheStats, ResultCache};
use crate::compute::bucket_index::BucketIndex;
use crate::compute::centroid::estimate;
use crate::compute::grid::Grid;
use crate::compute::intersection::Intersection;
use crate::compute::validation::{
    ValidatedQuery, validate_buckets, validate_points, validate_query,
};
use crate::config::Config;
use crate::error::{MultilatError, Result};
use crate::visualize::{IntersectionFrame, IntersectionSink};
use crate::{Beacon, Bounds, Bucket, Centroid, Point};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Resolver called with the caller's beacon list when a query has no solution.
pub type Fallback<'a> = Box<dyn Fn(&[Beacon]) -> Centroid + Send + Sync + 'a>;

/// Per-call query options.
///
/// # Examples
///
/// ```rust
/// use multilat::{Centroid, QueryOptions};
///
/// let options = QueryOptions::new()
///     .with_fallback(|beacons| Centroid::new(beacons[0].point, f64::INFINITY))
///     .with_visualize("probe-1");
/// assert_eq!(options.visualize.as_deref(), Some("probe-1"));
/// ```
#[derive(Default)]
pub struct QueryOptions<'a> {
    /// Replaces a "no solution" outcome. Never cached.
    pub fallback: Option<Fallback<'a>>,
    /// Tag for the visualization hand-over. Forces a fresh search.
    pub visualize: Option<String>,
    /// Ground-truth position passed along with the visualization frame
    pub actual: Option<Point>,
}

impl<'a> QueryOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&[Beacon]) -> Centroid + Send + Sync + 'a,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn with_visualize<S: Into<String>>(mut self, tag: S) -> Self {
        self.visualize = Some(tag.into());
        self
    }

    pub fn with_actual(mut self, actual: Point) -> Self {
        self.actual = Some(actual);
        self
    }
}

impl fmt::Debug for QueryOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("fallback", &self.fallback.as_ref().map(|_| "<fn>"))
            .field("visualize", &self.visualize)
            .field("actual", &self.actual)
            .finish()
    }
}

/// Grid-based multilateration engine.
///
/// `Multilat` is `Send + Sync`: queries take `&self` and can be served from
/// many threads. Concurrent queries for the same bucket selection share a
/// single search.
///
/// # Examples
///
/// ```rust
/// use multilat::{Beacon, Bucket, Config, Multilat, Point};
/// use multilat::geometry::{bounds_from_center, destination};
///
/// # fn main() -> multilat::Result<()> {
/// let center = Point::new(45.0, 45.0);
/// let layout: Vec<Point> = [0.0, 120.0, 240.0]
///     .iter()
///     .map(|bearing| destination(&center, *bearing, 1300.0))
///     .collect();
/// let buckets = vec![
///     Bucket::new(0.0, 500.0),
///     Bucket::new(500.0, 1000.0),
///     Bucket::new(1000.0, 2000.0),
///     Bucket::new(2000.0, 5000.0),
/// ];
///
/// let engine = Multilat::with_config(
///     bounds_from_center(&center, 5000.0),
///     layout.clone(),
///     buckets.clone(),
///     Config::default().with_num_points(10_000),
/// )?;
///
/// let query: Vec<Beacon> = layout.iter().map(|p| Beacon::new(*p, buckets[2])).collect();
/// let estimate = engine.multilaterate(&query)?.expect("center is consistent");
/// assert!(estimate.err < 2000.0);
/// # Ok(())
/// # }
/// ```
pub struct Multilat {
    layout: Vec<Point>,
    buckets: Vec<Bucket>,
    grid: Grid,
    index: BucketIndex,
    cache: ResultCache,
    config: Config,
    sink: Option<Arc<dyn IntersectionSink>>,
}

impl Multilat {
    /// Build an engine with the default [`Config`].
    pub fn new(bounds: Bounds, layout: Vec<Point>, buckets: Vec<Bucket>) -> Result<Self> {
        Self::with_config(bounds, layout, buckets, Config::default())
    }

    /// Build an engine. This scans every grid point against every beacon and
    /// is the expensive step; reuse the engine for many queries.
    pub fn with_config(
        bounds: Bounds,
        layout: Vec<Point>,
        buckets: Vec<Bucket>,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        if layout.is_empty() {
            return Err(MultilatError::EmptyBeaconLayout);
        }
        validate_points(&layout)?;
        validate_buckets(&buckets)?;

        let start = Instant::now();
        let grid = Grid::new(bounds, config.num_points)?;
        let index = BucketIndex::build(&grid, &layout, &buckets, &config);

        log::info!(
            "built multilat engine: {} grid points ({}x{}), {} beacons, {} buckets in {:?}",
            grid.len(),
            grid.num_x(),
            grid.num_y(),
            layout.len(),
            buckets.len(),
            start.elapsed()
        );

        Ok(Self {
            layout,
            buckets,
            grid,
            index,
            cache: ResultCache::new(),
            config,
            sink: None,
        })
    }

    /// Attach the consumer for visualization requests.
    pub fn with_sink(mut self, sink: Arc<dyn IntersectionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Estimate the position consistent with every beacon's range.
    ///
    /// `beacons` must name exactly the configured beacon points, in any order,
    /// each with a range equal to one configured bucket. `Ok(None)` means no
    /// grid point satisfies all ranges.
    pub fn multilaterate(&self, beacons: &[Beacon]) -> Result<Option<Centroid>> {
        self.multilaterate_with(beacons, &QueryOptions::default())
    }

    /// [`multilaterate`](Self::multilaterate) with per-call options.
    pub fn multilaterate_with(
        &self,
        beacons: &[Beacon],
        options: &QueryOptions<'_>,
    ) -> Result<Option<Centroid>> {
        let query = validate_query(&self.layout, &self.buckets, beacons)?;

        if let Some(tag) = options.visualize.as_deref() {
            return Ok(self.search_and_emit(&query, beacons, tag, options));
        }

        let outcome = self.cached_search(&query);
        Ok(Self::resolve(outcome, beacons, options))
    }

    fn cached_search(&self, query: &ValidatedQuery) -> Option<Centroid> {
        let (outcome, computed) = self.cache.get_or_compute(&query.key, || {
            let candidates = self.candidates(&query.key);
            log::trace!(
                "bucket selection {:?}: {} candidates",
                query.key.as_slice(),
                candidates.len()
            );
            estimate(&candidates)
        });

        if computed {
            log::debug!("cache miss for {:?}", query.key.as_slice());
        } else {
            log::debug!("cache hit for {:?}", query.key.as_slice());
        }
        outcome
    }

    /// Always searches, stores the outcome and hands the candidate points to
    /// the sink.
    fn search_and_emit(
        &self,
        query: &ValidatedQuery,
        beacons: &[Beacon],
        tag: &str,
        options: &QueryOptions<'_>,
    ) -> Option<Centroid> {
        let candidates = self.candidates(&query.key);
        let outcome = estimate(&candidates);
        self.cache.insert(&query.key, outcome);

        let result = Self::resolve(outcome, beacons, options);

        match &self.sink {
            Some(sink) => sink.emit(&IntersectionFrame {
                tag,
                beacons: &query.beacons,
                actual: options.actual,
                candidates: &candidates,
                centroid: result,
            }),
            None => log::debug!("visualization '{}' requested without a sink", tag),
        }

        result
    }

    fn resolve(
        outcome: Option<Centroid>,
        beacons: &[Beacon],
        options: &QueryOptions<'_>,
    ) -> Option<Centroid> {
        match (outcome, &options.fallback) {
            (None, Some(fallback)) => Some(fallback(beacons)),
            (outcome, _) => outcome,
        }
    }

    /// Lazy intersection for a bucket selection in configured beacon order.
    pub fn search(&self, key: &[usize]) -> Intersection<'_> {
        Intersection::new(&self.index, key)
    }

    /// Grid points consistent with a bucket selection.
    pub fn candidates(&self, key: &[usize]) -> Vec<Point> {
        self.grid.points(self.search(key)).collect()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn index(&self) -> &BucketIndex {
        &self.index
    }

    /// Configured beacon points, in configured order.
    pub fn beacon_points(&self) -> &[Point] {
        &self.layout
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of bucket selections with a stored outcome.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl fmt::Debug for Multilat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multilat")
            .field("grid_points", &self.grid.len())
            .field("beacons", &self.layout.len())
            .field("buckets", &self.buckets.len())
            .field("cache", &self.cache.stats())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{bounds_from_center, destination, distance};
    use crate::visualize::MemorySink;

    fn buckets() -> Vec<Bucket> {
        vec![
            Bucket::new(0.0, 500.0),
            Bucket::new(500.0, 1000.0),
            Bucket::new(1000.0, 2000.0),
            Bucket::new(2000.0, 5000.0),
            Bucket::new(5000.0, 10000.0),
        ]
    }

    fn engine() -> Multilat {
        let center = Point::new(45.0, 45.0);
        let layout = [0.0, 120.0, 240.0]
            .iter()
            .map(|b| destination(&center, *b, 1300.0))
            .collect();
        Multilat::with_config(
            bounds_from_center(&center, 3000.0),
            layout,
            buckets(),
            Config::default().with_num_points(2_500),
        )
        .unwrap()
    }

    /// Beacons a distance service would report for grid point `idx`.
    fn observe(engine: &Multilat, idx: usize) -> Vec<Beacon> {
        let actual = engine.grid().at(idx);
        engine
            .beacon_points()
            .iter()
            .map(|p| {
                let d = distance(p, &actual);
                let range = *engine.buckets().iter().find(|b| b.contains(d)).unwrap();
                Beacon::new(*p, range)
            })
            .collect()
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Multilat>();
    }

    #[test]
    fn test_construction_rejects_bad_input() {
        let bounds = bounds_from_center(&Point::new(45.0, 45.0), 3000.0);
        let layout = vec![Point::new(45.0, 45.0)];

        assert_eq!(
            Multilat::new(bounds, Vec::new(), buckets()).unwrap_err(),
            MultilatError::EmptyBeaconLayout
        );
        assert_eq!(
            Multilat::new(bounds, layout.clone(), Vec::new()).unwrap_err(),
            MultilatError::EmptyBucketList
        );
        assert!(matches!(
            Multilat::new(bounds, layout.clone(), vec![Bucket::new(10.0, 5.0)]),
            Err(MultilatError::InvalidBucket { index: 0, .. })
        ));
        assert_eq!(
            Multilat::with_config(bounds, layout, buckets(), Config::default().with_num_points(3))
                .unwrap_err(),
            MultilatError::GridTooSmall { requested: 3 }
        );
    }

    #[test]
    fn test_observed_grid_point_is_recovered() {
        let engine = engine();
        let idx = engine.grid().len() / 2 + 7;
        let actual = engine.grid().at(idx);

        let centroid = engine.multilaterate(&observe(&engine, idx)).unwrap().unwrap();
        // The true point is a candidate, so it lies inside the error radius
        assert!(distance(&centroid.point, &actual) <= centroid.err);
    }

    #[test]
    fn test_repeat_query_hits_cache() {
        let engine = engine();
        let beacons = observe(&engine, 1234);

        let first = engine.multilaterate(&beacons).unwrap();
        let second = engine.multilaterate(&beacons).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.cache_len(), 1);

        let stats = engine.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_no_solution_and_fallback() {
        let engine = engine();
        let beacons: Vec<Beacon> = engine
            .beacon_points()
            .iter()
            .map(|p| Beacon::new(*p, Bucket::new(0.0, 500.0)))
            .collect();

        assert_eq!(engine.multilaterate(&beacons).unwrap(), None);

        let fallback = Centroid::new(Point::new(1.0, 2.0), 42.0);
        let options = QueryOptions::new().with_fallback(move |_| fallback);
        assert_eq!(
            engine.multilaterate_with(&beacons, &options).unwrap(),
            Some(fallback)
        );

        // Only the search outcome is stored
        assert_eq!(engine.multilaterate(&beacons).unwrap(), None);
        assert_eq!(engine.cache_len(), 1);
    }

    #[test]
    fn test_fallback_receives_caller_order() {
        let engine = engine();
        let mut beacons: Vec<Beacon> = engine
            .beacon_points()
            .iter()
            .map(|p| Beacon::new(*p, Bucket::new(0.0, 500.0)))
            .collect();
        beacons.reverse();
        let first = beacons[0].point;

        let options =
            QueryOptions::new().with_fallback(|given| Centroid::new(given[0].point, 0.0));
        let result = engine.multilaterate_with(&beacons, &options).unwrap().unwrap();
        assert_eq!(result.point, first);
    }

    #[test]
    fn test_validation_runs_before_search() {
        let engine = engine();
        let beacons = observe(&engine, 10);

        assert_eq!(
            engine.multilaterate(&beacons[..2]).unwrap_err(),
            MultilatError::WrongBeaconCount {
                expected: 3,
                actual: 2
            }
        );

        let mut bad = beacons.clone();
        bad[1].range = Bucket::new(0.0, 750.0);
        assert!(matches!(
            engine.multilaterate(&bad),
            Err(MultilatError::UnmatchedBucketRange { beacon_index: 1, .. })
        ));
        assert_eq!(engine.cache_stats(), CacheStats::default());
    }

    #[test]
    fn test_visualization_bypasses_cache_hit() {
        let sink = Arc::new(MemorySink::new());
        let engine = engine().with_sink(sink.clone());
        let idx = 900;
        let beacons = observe(&engine, idx);
        let actual = engine.grid().at(idx);

        let cached = engine.multilaterate(&beacons).unwrap();
        let options = QueryOptions::new()
            .with_visualize("probe")
            .with_actual(actual);
        let shown = engine.multilaterate_with(&beacons, &options).unwrap();
        assert_eq!(cached, shown);

        let frames = sink.take();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.tag, "probe");
        assert_eq!(frame.actual, Some(actual));
        assert_eq!(frame.centroid, shown);
        assert!(frame.candidates.contains(&actual));
        assert_eq!(estimate(&frame.candidates), shown);
        assert_eq!(engine.cache_len(), 1);
    }

    #[test]
    fn test_candidates_match_search() {
        let engine = engine();
        let key = [2usize, 2, 2];
        let points = engine.candidates(&key);
        assert_eq!(points.len(), engine.search(&key).count());
        // Out-of-range bucket indices behave as empty sets
        assert!(engine.candidates(&[2, 2, 99]).is_empty());
    }

    #[test]
    fn test_clear_cache() {
        let engine = engine();
        engine.multilaterate(&observe(&engine, 5)).unwrap();
        assert_eq!(engine.cache_len(), 1);
        engine.clear_cache();
        assert_eq!(engine.cache_len(), 0);
    }
}
