//! Position estimation from bucketed distance ranges.
//!
//! Each beacon reports only which distance bucket ("between 1000m and
//! 2000m") the unknown position falls in. The engine discretizes the search
//! area into a grid, indexes every grid point by its bucket for each beacon,
//! and answers a query by intersecting the selected point sets and reducing
//! the survivors to a centroid with a worst-case error radius.
//!
//! ```rust
//! use multilat::{Beacon, Bucket, Multilat, MultilatBuilder, Point};
//! use multilat::geometry::{bounds_from_center, destination};
//!
//! let center = Point::new(45.0, 45.0);
//! let layout: Vec<Point> = [0.0, 120.0, 240.0]
//!     .iter()
//!     .map(|bearing| destination(&center, *bearing, 1300.0))
//!     .collect();
//!
//! let engine = MultilatBuilder::new(bounds_from_center(&center, 5000.0))
//!     .beacons(layout.clone())
//!     .buckets([
//!         Bucket::new(0.0, 1000.0),
//!         Bucket::new(1000.0, 2000.0),
//!         Bucket::new(2000.0, 5000.0),
//!     ])
//!     .num_points(10_000)
//!     .build()?;
//!
//! let report: Vec<Beacon> = layout
//!     .iter()
//!     .map(|p| Beacon::new(*p, Bucket::new(1000.0, 2000.0)))
//!     .collect();
//!
//! if let Some(estimate) = engine.multilaterate(&report)? {
//!     println!("{:?} +/- {:.0}m", estimate.point, estimate.err);
//! }
//! # Ok::<(), multilat::MultilatError>(())
//! ```

pub mod builder;
pub mod cache;
pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod geometry;
pub mod visualize;

pub use builder::MultilatBuilder;
pub use cache::{BucketKey, CacheLookup, CacheStats};
pub use config::Config;
pub use engine::{Fallback, Multilat, QueryOptions};
pub use error::{MultilatError, Result};
pub use evaluate::{ErrorStats, GridTestSample, bucket_for, simulate_beacons};
pub use visualize::{IntersectionFrame, IntersectionSink, LogSink, MemorySink};

#[cfg(feature = "geojson")]
pub use visualize::GeoJsonSink;

pub use multilat_types::centroid::Centroid;
pub use multilat_types::point::{Bounds, Point};
pub use multilat_types::range::{Beacon, Bucket};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Multilat, MultilatBuilder, MultilatError, QueryOptions, Result};

    pub use crate::{Beacon, Bounds, Bucket, Centroid, Point};

    pub use crate::geometry::{bounds_from_center, destination, distance};

    pub use crate::Config;

    pub use crate::{ErrorStats, IntersectionSink};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
