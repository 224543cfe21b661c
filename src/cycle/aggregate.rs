//! aggregate — per-segment reductions of channel values.
//!
//! Purpose
//! -------
//! Summarize every segment of a cycle by a single number per channel, e.g. the
//! mean stress of a half-cycle (midpoint of its end values) or its stress
//! range (difference of its end values).
//!
//! Key behaviors
//! -------------
//! - Apply a [`Reduction`] to `(x[start], x[end])` of every segment produced by
//!   [`SegmentBoundaryGroups::segments`].
//! - Return one array per segment type and channel.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every boundary index is checked against the series length before any
//!   value is read; out-of-range boundaries fail with a bounds error.
use std::collections::BTreeMap;

use ndarray::Array1;

use crate::{
    cycle::{errors::CycleResult, groups::SegmentBoundaryGroups},
    data::series::TimeSeries,
};

/// Per-channel results, one array per segment type.
pub type SegmentValues = BTreeMap<String, Vec<Array1<f64>>>;

/// Binary reduction applied to the start and end value of a segment.
#[derive(Debug, Clone, Copy)]
pub enum Reduction {
    /// `(a + b) / 2`
    Midpoint,
    /// `b - a`
    Difference,
    /// Caller-supplied reduction of `(start_value, end_value)`.
    Custom(fn(f64, f64) -> f64),
}

impl Reduction {
    pub fn apply(&self, start: f64, end: f64) -> f64 {
        match self {
            Reduction::Midpoint => (start + end) / 2.0,
            Reduction::Difference => end - start,
            Reduction::Custom(f) => f(start, end),
        }
    }
}

/// Reduce the end values of every segment for the given channels.
///
/// Parameters
/// ----------
/// - `series`: `&TimeSeries`
/// - `channels`: names of the channels to reduce.
/// - `groups`: `&SegmentBoundaryGroups`
/// - `reduction`: `Reduction`
///
/// Returns
/// -------
/// `CycleResult<SegmentValues>`
///   `result[channel][i][j]` is the reduction of the `j`-th segment of type `i`.
///
/// Errors
/// ------
/// - `CycleError::IndexOutOfRange` if any boundary is `>= series.len()`.
/// - `CycleError::Data(MissingChannel)` for an unknown channel.
pub fn aggregate<S: AsRef<str>>(
    series: &TimeSeries, channels: &[S], groups: &SegmentBoundaryGroups, reduction: Reduction,
) -> CycleResult<SegmentValues> {
    groups.check_within(series.len())?;
    let segments = groups.segments();

    let mut out = SegmentValues::new();
    for name in channels {
        let name = name.as_ref();
        let values = series.channel(name)?;
        let per_type: Vec<Array1<f64>> = segments
            .iter()
            .map(|segs| segs.iter().map(|s| reduction.apply(values[s.start], values[s.end])).collect())
            .collect();
        out.insert(name.to_string(), per_type);
    }
    Ok(out)
}

/// Segment midpoints `(x[start] + x[end]) / 2`.
pub fn mid_values<S: AsRef<str>>(
    series: &TimeSeries, channels: &[S], groups: &SegmentBoundaryGroups,
) -> CycleResult<SegmentValues> {
    aggregate(series, channels, groups, Reduction::Midpoint)
}

/// Segment ranges `x[end] - x[start]`.
pub fn diff_values<S: AsRef<str>>(
    series: &TimeSeries, channels: &[S], groups: &SegmentBoundaryGroups,
) -> CycleResult<SegmentValues> {
    aggregate(series, channels, groups, Reduction::Difference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::errors::CycleError;
    use ndarray::array;

    fn ramp_series() -> TimeSeries {
        TimeSeries::from_pairs([("x", Array1::linspace(1.0, 10.0, 10))]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Midpoints follow the segment pairing including the wraparound type.
    //
    // Given
    // -----
    // - x = [1, 2, …, 10], groups [[1, 4, 9], [2, 7]].
    //
    // Expect
    // ------
    // - Type 0: [2.5, 6.5]; type 1: [4, 9].
    fn mid_values_follow_segment_pairs() {
        // Arrange
        let series = ramp_series();
        let groups = SegmentBoundaryGroups::new(vec![vec![1, 4, 9], vec![2, 7]]).unwrap();

        // Act
        let mids = mid_values(&series, &["x"], &groups).unwrap();

        // Assert
        assert_eq!(mids["x"], vec![array![2.5, 6.5], array![4.0, 9.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Differences use end minus start.
    //
    // Given
    // -----
    // - x = [1, …, 10], groups [[1, 5, 8], [3, 7, 9]].
    //
    // Expect
    // ------
    // - Type 0: [2, 2, 1]; type 1: [2, 1].
    fn diff_values_are_end_minus_start() {
        let series = ramp_series();
        let groups = SegmentBoundaryGroups::new(vec![vec![1, 5, 8], vec![3, 7, 9]]).unwrap();

        let diffs = diff_values(&series, &["x"], &groups).unwrap();

        assert_eq!(diffs["x"], vec![array![2.0, 2.0, 1.0], array![2.0, 1.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Custom reductions receive (start, end).
    fn custom_reduction_receives_start_and_end() {
        let series = ramp_series();
        let groups = SegmentBoundaryGroups::new(vec![vec![0, 4]]).unwrap();

        let maxes = aggregate(&series, &["x"], &groups, Reduction::Custom(f64::max)).unwrap();

        assert_eq!(maxes["x"], vec![array![5.0]]);
    }

    #[test]
    // Purpose
    // -------
    // A boundary past the end of the data is a bounds error.
    fn out_of_range_boundary_is_rejected() {
        let series = ramp_series();
        let groups = SegmentBoundaryGroups::new(vec![vec![1, 12]]).unwrap();

        let err = mid_values(&series, &["x"], &groups).unwrap_err();

        assert_eq!(err, CycleError::IndexOutOfRange { index: 12, len: 10 });
    }
}
