//! # multilat-types
//!
//! Core geographic record types for the multilat engine.
//!
//! This crate provides the plain, serializable records exchanged with the
//! engine:
//!
//! - **Positions**: `Point`, `Bounds`
//! - **Measurements**: `Bucket` (a half-open distance range), `Beacon`
//! - **Estimates**: `Centroid`
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's primitives where one exists.
//!
//! ## Examples
//!
//! ```rust
//! use multilat_types::point::Point;
//! use multilat_types::range::{Beacon, Bucket};
//!
//! let station = Point::new(45.0, 45.0);
//! let beacon = Beacon::new(station, Bucket::new(1000.0, 2000.0));
//! assert!(beacon.range.contains(1500.0));
//! ```

pub mod centroid;
pub mod point;
pub mod range;
