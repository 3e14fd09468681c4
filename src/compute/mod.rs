//! Compute layer for the estimation engine.
//!
//! - `grid`: the candidate point lattice
//! - `bucket_index`: per-beacon, per-bucket point sets built once per engine
//! - `intersection`: lazy set intersection for a bucket selection
//! - `centroid`: position estimate and error radius for a point set
//! - `validation`: configuration and query validation

pub mod bucket_index;
pub mod centroid;
pub mod grid;
pub mod intersection;
pub mod validation;
