//! Engine builder for flexible configuration
//!
//! This module provides a builder pattern for creating engines with
//! construction options and an optional visualization sink.

use crate::config::Config;
use crate::engine::Multilat;
use crate::error::Result;
use crate::visualize::IntersectionSink;
use crate::{Bounds, Bucket, Point};
use std::fmt;
use std::sync::Arc;

/// Builder for a [`Multilat`] engine.
///
/// # Examples
///
/// ```rust
/// use multilat::{Bucket, MultilatBuilder, Point};
/// use multilat::geometry::bounds_from_center;
/// use multilat::visualize::LogSink;
/// use std::sync::Arc;
///
/// # fn main() -> multilat::Result<()> {
/// let center = Point::new(45.0, 45.0);
/// let engine = MultilatBuilder::new(bounds_from_center(&center, 2000.0))
///     .beacon(center)
///     .bucket(Bucket::new(0.0, 1000.0))
///     .bucket(Bucket::new(1000.0, 5000.0))
///     .num_points(400)
///     .sink(Arc::new(LogSink))
///     .build()?;
///
/// assert_eq!(engine.grid().len(), 400);
/// # Ok(())
/// # }
/// ```
pub struct MultilatBuilder {
    bounds: Bounds,
    layout: Vec<Point>,
    buckets: Vec<Bucket>,
    config: Config,
    sink: Option<Arc<dyn IntersectionSink>>,
}

impl MultilatBuilder {
    /// Start a builder for the given search area with default configuration.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            layout: Vec::new(),
            buckets: Vec::new(),
            config: Config::default(),
            sink: None,
        }
    }

    /// Append a beacon point. Order is the engine's beacon order.
    pub fn beacon(mut self, point: Point) -> Self {
        self.layout.push(point);
        self
    }

    pub fn beacons<I: IntoIterator<Item = Point>>(mut self, points: I) -> Self {
        self.layout.extend(points);
        self
    }

    /// Append a distance bucket. Order is the engine's bucket order.
    pub fn bucket(mut self, bucket: Bucket) -> Self {
        self.buckets.push(bucket);
        self
    }

    pub fn buckets<I: IntoIterator<Item = Bucket>>(mut self, buckets: I) -> Self {
        self.buckets.extend(buckets);
        self
    }

    /// Set the engine configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Target number of grid points.
    pub fn num_points(mut self, num_points: usize) -> Self {
        self.config = self.config.clone().with_num_points(num_points);
        self
    }

    pub fn parallel_build(mut self, parallel: bool) -> Self {
        self.config = self.config.clone().with_parallel_build(parallel);
        self
    }

    /// Consumer for queries that request visualization.
    pub fn sink(mut self, sink: Arc<dyn IntersectionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the engine. Validates the configuration, layout and buckets,
    /// then builds the grid and bucket index.
    pub fn build(self) -> Result<Multilat> {
        let engine = Multilat::with_config(self.bounds, self.layout, self.buckets, self.config)?;
        Ok(match self.sink {
            Some(sink) => engine.with_sink(sink),
            None => engine,
        })
    }
}

impl fmt::Debug for MultilatBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultilatBuilder")
            .field("bounds", &self.bounds)
            .field("layout", &self.layout)
            .field("buckets", &self.buckets)
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Beacon;
    use crate::error::MultilatError;
    use crate::geometry::bounds_from_center;
    use crate::visualize::MemorySink;
    use crate::QueryOptions;

    fn bounds() -> Bounds {
        bounds_from_center(&Point::new(45.0, 45.0), 2000.0)
    }

    #[test]
    fn test_builder_default() {
        let builder = MultilatBuilder::new(bounds());
        assert!(builder.layout.is_empty());
        assert!(builder.sink.is_none());
        assert_eq!(builder.config, Config::default());
    }

    #[test]
    fn test_builder_requires_layout_and_buckets() {
        let err = MultilatBuilder::new(bounds())
            .bucket(Bucket::new(0.0, 100.0))
            .build()
            .unwrap_err();
        assert_eq!(err, MultilatError::EmptyBeaconLayout);

        let err = MultilatBuilder::new(bounds())
            .beacon(Point::new(45.0, 45.0))
            .build()
            .unwrap_err();
        assert_eq!(err, MultilatError::EmptyBucketList);
    }

    #[test]
    fn test_builder_config_options() {
        let engine = MultilatBuilder::new(bounds())
            .beacons([Point::new(45.0, 45.0), Point::new(45.01, 45.0)])
            .buckets([Bucket::new(0.0, 1000.0), Bucket::new(1000.0, 5000.0)])
            .num_points(1000)
            .parallel_build(false)
            .build()
            .unwrap();

        // floor(sqrt(1000)) = 31
        assert_eq!(engine.grid().len(), 31 * 31);
        assert!(!engine.config().parallel_build);
        assert_eq!(engine.beacon_points().len(), 2);
        assert_eq!(engine.buckets().len(), 2);
    }

    #[test]
    fn test_builder_with_sink() {
        let sink = Arc::new(MemorySink::new());
        let center = Point::new(45.0, 45.0);
        let engine = MultilatBuilder::new(bounds())
            .beacon(center)
            .buckets([Bucket::new(0.0, 1000.0), Bucket::new(1000.0, 5000.0)])
            .num_points(400)
            .sink(sink.clone())
            .build()
            .unwrap();

        let beacons = [Beacon::new(center, Bucket::new(0.0, 1000.0))];
        let options = QueryOptions::new().with_visualize("builder");
        let result = engine.multilaterate_with(&beacons, &options).unwrap();

        assert!(result.is_some());
        assert_eq!(sink.len(), 1);
    }
}
