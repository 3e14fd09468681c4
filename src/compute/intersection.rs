//! Intersection of the per-beacon point sets selected by a query.

use crate::compute::bucket_index::{BucketIndex, PointSet};
use crate::compute::grid::GridIndex;
use smallvec::SmallVec;

/// Lazy sequence of grid indices present in every selected set.
///
/// The selected sets are ordered smallest first; the smallest set is walked
/// and each element is tested for membership in the rest, which keeps the
/// number of membership checks as low as possible. Output is ascending.
///
/// # Examples
///
/// ```rust
/// use multilat::compute::bucket_index::PointSet;
/// use multilat::compute::intersection::Intersection;
///
/// let a: PointSet = [1, 2, 3, 4, 5].into_iter().collect();
/// let b: PointSet = [2, 4, 6].into_iter().collect();
/// let mut hits = Intersection::from_sets([&a, &b]);
/// assert_eq!(hits.by_ref().collect::<Vec<_>>(), vec![2, 4]);
///
/// hits.reset();
/// assert_eq!(hits.count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Intersection<'a> {
    sets: SmallVec<[&'a PointSet; 8]>,
    pos: usize,
}

impl<'a> Intersection<'a> {
    /// Select one set per beacon from `index`, `key[beacon]` naming the bucket.
    ///
    /// A `(beacon, bucket)` pair with no set is treated as an empty set.
    pub fn new(index: &'a BucketIndex, key: &[usize]) -> Self {
        Self::from_sets(
            key.iter()
                .enumerate()
                .map(|(beacon, &bucket)| index.get(beacon, bucket).unwrap_or(PointSet::empty())),
        )
    }

    pub fn from_sets<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a PointSet>,
    {
        let mut sets: SmallVec<[&'a PointSet; 8]> = sets.into_iter().collect();
        // Stable sort: equal-sized sets keep beacon order
        sets.sort_by_key(|set| set.len());
        Self { sets, pos: 0 }
    }

    /// Rewind to the start of the sequence.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Upper bound on the number of results: the size of the smallest set.
    pub fn upper_bound(&self) -> usize {
        self.sets.first().map_or(0, |s| s.len())
    }

    /// Sizes of the selected sets, smallest first.
    pub fn set_sizes(&self) -> SmallVec<[usize; 8]> {
        self.sets.iter().map(|s| s.len()).collect()
    }
}

impl Iterator for Intersection<'_> {
    type Item = GridIndex;

    fn next(&mut self) -> Option<GridIndex> {
        let (smallest, rest) = self.sets.split_first()?;
        let candidates = smallest.as_slice();

        while let Some(&idx) = candidates.get(self.pos) {
            self.pos += 1;
            if rest.iter().all(|set| set.contains(idx)) {
                return Some(idx);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.upper_bound().saturating_sub(self.pos);
        (0, Some(remaining))
    }
}

impl std::iter::FusedIterator for Intersection<'_> {}
