//! Per-beacon, per-bucket sets of grid points.
//!
//! For every beacon and every bucket the index holds the grid points whose
//! great-circle distance to that beacon falls in the bucket. It is built once
//! when an engine is constructed and never changes afterwards.
//!
//! Building costs `O(grid × beacons × buckets)`. With the `parallel` feature
//! the grid is split into contiguous index ranges, each scanned by a rayon
//! worker that owns its slice of results; the slices are concatenated in
//! range order, so every set stays sorted without any locking.

use crate::compute::grid::{Grid, GridIndex};
use crate::config::Config;
use crate::geometry::distance;
use crate::{Bucket, Point};
use std::ops::Range;

/// An ascending set of grid indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSet {
    indices: Vec<GridIndex>,
}

static EMPTY_SET: PointSet = PointSet {
    indices: Vec::new(),
};

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared empty set, standing in for sets that do not exist.
    pub fn empty() -> &'static PointSet {
        &EMPTY_SET
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn contains(&self, idx: GridIndex) -> bool {
        self.indices.binary_search(&idx).is_ok()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, GridIndex>> {
        self.indices.iter().copied()
    }

    pub fn as_slice(&self) -> &[GridIndex] {
        &self.indices
    }
}

impl FromIterator<GridIndex> for PointSet {
    fn from_iter<I: IntoIterator<Item = GridIndex>>(iter: I) -> Self {
        let mut indices: Vec<GridIndex> = iter.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }
}

/// Raw output of scanning one contiguous range of the grid.
struct RangeScan {
    /// `[beacon][bucket]` ascending indices within the range
    sets: Vec<Vec<Vec<GridIndex>>>,
    /// Points per beacon that fell in no bucket
    uncovered: Vec<usize>,
}

fn scan_range(grid: &Grid, range: Range<usize>, layout: &[Point], buckets: &[Bucket]) -> RangeScan {
    let mut sets = vec![vec![Vec::new(); buckets.len()]; layout.len()];
    let mut uncovered = vec![0usize; layout.len()];

    for idx in range {
        let point = grid.at(idx);
        for (beacon_idx, beacon) in layout.iter().enumerate() {
            let dist = distance(beacon, &point);
            match buckets.iter().position(|bucket| bucket.contains(dist)) {
                Some(bucket_idx) => sets[beacon_idx][bucket_idx].push(idx as GridIndex),
                None => uncovered[beacon_idx] += 1,
            }
        }
    }

    RangeScan { sets, uncovered }
}

#[cfg(feature = "parallel")]
fn scan_parallel(grid: &Grid, layout: &[Point], buckets: &[Bucket]) -> Vec<RangeScan> {
    use rayon::prelude::*;

    let n = grid.len();
    let threads = rayon::current_num_threads().max(1);
    let chunk_size = (n / (threads * 8)).clamp(256, 16_384).max(1);

    let mut ranges = Vec::with_capacity(n.div_ceil(chunk_size));
    let mut start = 0;
    while start < n {
        let end = (start + chunk_size).min(n);
        ranges.push(start..end);
        start = end;
    }

    ranges
        .into_par_iter()
        .map(|range| scan_range(grid, range, layout, buckets))
        .collect()
}

/// Grid point sets keyed by `(beacon, bucket)`.
#[derive(Debug, Clone)]
pub struct BucketIndex {
    /// `[beacon][bucket]`
    sets: Vec<Vec<PointSet>>,
    uncovered: Vec<usize>,
}

impl BucketIndex {
    /// Scan every grid point against every beacon and bucket.
    ///
    /// A point whose distance to a beacon falls in no bucket is left out of
    /// all of that beacon's sets.
    pub fn build(grid: &Grid, layout: &[Point], buckets: &[Bucket], config: &Config) -> Self {
        #[cfg(feature = "parallel")]
        let scans = if config.parallel_build {
            scan_parallel(grid, layout, buckets)
        } else {
            vec![scan_range(grid, 0..grid.len(), layout, buckets)]
        };

        #[cfg(not(feature = "parallel"))]
        let scans = vec![scan_range(grid, 0..grid.len(), layout, buckets)];

        let index = Self::merge(scans, layout.len(), buckets.len());

        if config.warn_uncovered {
            for (beacon_idx, &count) in index.uncovered.iter().enumerate() {
                if count > 0 {
                    log::warn!(
                        "{} of {} grid points are outside every bucket for beacon {} at ({}, {})",
                        count,
                        grid.len(),
                        beacon_idx,
                        layout[beacon_idx].lat,
                        layout[beacon_idx].lon
                    );
                }
            }
        }

        index
    }

    /// Concatenate range scans in order. Ranges are ascending and disjoint,
    /// so the concatenation of each set is ascending too.
    fn merge(scans: Vec<RangeScan>, beacons: usize, buckets: usize) -> Self {
        let mut sets: Vec<Vec<Vec<GridIndex>>> = vec![vec![Vec::new(); buckets]; beacons];
        let mut uncovered = vec![0usize; beacons];

        for scan in scans {
            for (beacon_idx, row) in scan.sets.into_iter().enumerate() {
                for (bucket_idx, part) in row.into_iter().enumerate() {
                    sets[beacon_idx][bucket_idx].extend(part);
                }
                uncovered[beacon_idx] += scan.uncovered[beacon_idx];
            }
        }

        let sets = sets
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|indices| PointSet { indices })
                    .collect()
            })
            .collect();

        Self { sets, uncovered }
    }

    /// The set for `(beacon, bucket)`, or `None` if either index is out of range.
    pub fn get(&self, beacon: usize, bucket: usize) -> Option<&PointSet> {
        self.sets.get(beacon)?.get(bucket)
    }

    pub fn num_beacons(&self) -> usize {
        self.sets.len()
    }

    pub fn num_buckets(&self) -> usize {
        self.sets.first().map_or(0, Vec::len)
    }

    /// Grid points not covered by any bucket for `beacon`.
    pub fn uncovered(&self, beacon: usize) -> usize {
        self.uncovered.get(beacon).copied().unwrap_or(0)
    }
}
