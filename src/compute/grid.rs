//! Candidate point lattice covering a search area.
//!
//! The lattice is a uniform grid in latitude/longitude degrees, not an
//! equal-area grid: cells shrink east-west as latitude grows.

use crate::compute::validation::validate_bounds;
use crate::config::Config;
use crate::error::{MultilatError, Result};
use crate::{Bounds, Point};

/// Index of a point within a [`Grid`].
pub type GridIndex = u32;

/// A fixed, index-addressable lattice of candidate points.
///
/// A grid built for `n` target points has `floor(sqrt(n))` rows and columns.
/// Index `i` maps to column `i % num_x` and row `i / num_x`, with row 0 on
/// the bottom edge and column 0 on the left edge; both the first and last
/// row/column lie exactly on the bounds.
///
/// # Examples
///
/// ```rust
/// use multilat::{Bounds, Point};
/// use multilat::compute::grid::Grid;
///
/// let grid = Grid::new(Bounds::new(0.0, 1.0, 0.0, 1.0), 10).unwrap();
/// assert_eq!(grid.len(), 9);
/// assert_eq!(grid.at(0), Point::new(0.0, 0.0));
/// assert_eq!(grid.at(8), Point::new(1.0, 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    bounds: Bounds,
    num_x: usize,
    num_y: usize,
    incr_lat: f64,
    incr_lon: f64,
}

impl Grid {
    /// Build a grid over `bounds` using `floor(sqrt(num_points))^2` points.
    pub fn new(bounds: Bounds, num_points: usize) -> Result<Self> {
        validate_bounds(&bounds)?;

        if num_points < Config::MIN_POINTS {
            return Err(MultilatError::GridTooSmall {
                requested: num_points,
            });
        }

        let side = num_points.isqrt();
        if side.saturating_mul(side) > GridIndex::MAX as usize {
            return Err(MultilatError::InvalidInput(format!(
                "grid of {} points exceeds the addressable index range",
                side.saturating_mul(side)
            )));
        }

        Ok(Self {
            bounds,
            num_x: side,
            num_y: side,
            incr_lat: bounds.height() / (side - 1) as f64,
            incr_lon: bounds.width() / (side - 1) as f64,
        })
    }

    /// Number of points in the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_x * self.num_y
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Columns (longitude steps).
    pub fn num_x(&self) -> usize {
        self.num_x
    }

    /// Rows (latitude steps).
    pub fn num_y(&self) -> usize {
        self.num_y
    }

    /// Spacing between adjacent rows and columns as `(lat, lon)` degrees.
    pub fn spacing(&self) -> (f64, f64) {
        (self.incr_lat, self.incr_lon)
    }

    /// The point at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    #[inline]
    pub fn at(&self, idx: usize) -> Point {
        assert!(
            idx < self.len(),
            "grid index {} out of range for grid of {} points",
            idx,
            self.len()
        );
        let x = idx % self.num_x;
        let y = idx / self.num_x;
        Point::new(
            self.bounds.bottom + y as f64 * self.incr_lat,
            self.bounds.left + x as f64 * self.incr_lon,
        )
    }

    /// The point at `idx`, or `None` when out of range.
    pub fn get(&self, idx: usize) -> Option<Point> {
        (idx < self.len()).then(|| self.at(idx))
    }

    /// Sequential traversal from index 0.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter { grid: self, next: 0 }
    }

    /// Resolve grid indices to their points.
    pub fn points<'a, I>(&'a self, indices: I) -> impl Iterator<Item = Point> + 'a
    where
        I: IntoIterator<Item = GridIndex>,
        I::IntoIter: 'a,
    {
        indices.into_iter().map(move |idx| self.at(idx as usize))
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = Point;
    type IntoIter = GridIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Restartable cursor over a [`Grid`].
#[derive(Debug, Clone)]
pub struct GridIter<'a> {
    grid: &'a Grid,
    next: usize,
}

impl GridIter<'_> {
    /// Rewind to index 0.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

impl Iterator for GridIter<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let point = self.grid.get(self.next)?;
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridIter<'_> {}
