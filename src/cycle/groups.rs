//! groups — segment boundary groups and their pairing into segments.
//!
//! Purpose
//! -------
//! Represent the output of segment detection: K groups of sample indices,
//! where group `i` holds the `i`-th boundary of every cycle (e.g. peaks in
//! group 0, valleys in group 1). Pair adjacent groups into the segments that
//! the aggregation, smoothing and yield analyses iterate over.
//!
//! Key behaviors
//! -------------
//! - [`SegmentBoundaryGroups::new`] validates that the groups are a
//!   round-robin split of one strictly increasing index sequence.
//! - [`SegmentBoundaryGroups::segments`] pairs group `i` (starts) with group
//!   `(i + 1) mod K` (ends); the wraparound type takes its ends from group 0
//!   without its first element. Starts are truncated to the available ends.
//! - [`SegmentBoundaryGroups::flattened`] returns all boundaries in
//!   ascending order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Interleaving `g[0][0], g[1][0], …, g[K-1][0], g[0][1], …` yields a
//!   strictly increasing sequence that uses every index exactly once.
//! - Consequently every segment satisfies `start < end`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover pairing for K = 1, 2, 3 and rejection of groups that
//!   are not a round-robin split.
use crate::cycle::errors::{CycleError, CycleResult};

/// One segment: samples `[start, end]` between two consecutive boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

/// K groups of boundary indices, one group per boundary type of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentBoundaryGroups {
    groups: Vec<Vec<usize>>,
}

impl SegmentBoundaryGroups {
    /// Validate and wrap boundary groups.
    ///
    /// Parameters
    /// ----------
    /// - `groups`: `Vec<Vec<usize>>`
    ///   K ≥ 1 groups. Trailing groups may be one element shorter than the
    ///   leading ones (a ragged final cycle) and may be empty.
    ///
    /// Errors
    /// ------
    /// - `CycleError::NoGroups` if `groups` is empty.
    /// - `CycleError::UnbalancedGroups` if a group is longer than its
    ///   predecessor or more than one shorter than group 0.
    /// - `CycleError::NonIncreasingBoundaries` if the interleaved sequence is
    ///   not strictly increasing.
    pub fn new(groups: Vec<Vec<usize>>) -> CycleResult<Self> {
        let first_len = groups.first().map(Vec::len).ok_or(CycleError::NoGroups)?;
        for (group, window) in groups.windows(2).enumerate() {
            let len = window[1].len();
            if len > window[0].len() || len + 1 < first_len {
                return Err(CycleError::UnbalancedGroups { group: group + 1, len, first_len });
            }
        }

        let mut previous: Option<usize> = None;
        for position in 0..first_len {
            for (group, members) in groups.iter().enumerate() {
                let Some(&index) = members.get(position) else {
                    continue;
                };
                if previous.is_some_and(|p| index <= p) {
                    return Err(CycleError::NonIncreasingBoundaries { group, position, index });
                }
                previous = Some(index);
            }
        }
        Ok(SegmentBoundaryGroups { groups })
    }

    /// Number of boundary groups K.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub fn group(&self, i: usize) -> Option<&[usize]> {
        self.groups.get(i).map(Vec::as_slice)
    }

    /// Total number of boundaries across all groups.
    pub fn num_boundaries(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// All boundary indices in ascending order.
    pub fn flattened(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.groups.iter().flatten().copied().collect();
        all.sort_unstable();
        all
    }

    /// Largest boundary index, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.groups.iter().flatten().copied().max()
    }

    /// Fail with `CycleError::IndexOutOfRange` if any boundary is `>= len`.
    pub fn check_within(&self, len: usize) -> CycleResult<()> {
        match self.max_index() {
            Some(index) if index >= len => Err(CycleError::IndexOutOfRange { index, len }),
            _ => Ok(()),
        }
    }

    /// Pair adjacent groups into segments, one list per segment type.
    ///
    /// Returns
    /// -------
    /// `Vec<Vec<Segment>>` of length K. Entry `i` holds the segments that
    /// start at a group-`i` boundary.
    pub fn segments(&self) -> Vec<Vec<Segment>> {
        let k = self.groups.len();
        (0..k)
            .map(|i| {
                let starts = &self.groups[i];
                let ends: &[usize] = if i + 1 < k {
                    &self.groups[i + 1]
                } else {
                    self.groups[0].get(1..).unwrap_or(&[])
                };
                starts.iter().zip(ends).map(|(&start, &end)| Segment { start, end }).collect()
            })
            .collect()
    }
}
