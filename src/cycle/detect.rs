//! detect — segment boundary detection from monotonic step counters.
//!
//! Purpose
//! -------
//! Locate the samples where a loading segment ends and the next begins. Test
//! machines increment a step counter (`stp`) at every segment change; the
//! detector turns those increments into [`SegmentBoundaryGroups`], one group
//! per boundary type of a cycle.
//!
//! Key behaviors
//! -------------
//! - [`step_change_indices`]: index 0 followed by every index where the
//!   counter jumps by more than `tol`.
//! - [`detect`]: skip the first `num_skip` change indices and distribute the
//!   rest round-robin over K groups.
//! - [`detect_by_metric`]: walk the change indices and accept a candidate
//!   only when a caller-supplied distance from the last accepted boundary
//!   exceeds `min_change`. Accepted boundaries fill groups 1, 2, …, K−1, 0,
//!   1, … so that index 0 always opens group 0.
//! - [`detect_by_strain_change`]: [`detect_by_metric`] with the von Mises
//!   strain distance `sqrt(Δε² + Δγ²/3)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `stp` is non-decreasing (enforced by [`TimeSeries`]).
//! - The output always satisfies the [`SegmentBoundaryGroups`] invariants; a
//!   ragged final cycle is kept rather than dropped.
//!
//! Conventions
//! -----------
//! - The default tolerance `1e-6` ignores floating-point noise in counters
//!   stored as floats.
//!
//! Testing notes
//! -------------
//! - Unit tests reproduce the step-counter scenario for K = 1, 2, 3 and the
//!   strain-metric scenario with a minimum change of 0.2.
use ndarray::ArrayView1;
use tracing::debug;

use crate::{
    cycle::{
        errors::{CycleError, CycleResult},
        groups::SegmentBoundaryGroups,
    },
    data::series::{EPS, GAM, STP, TimeSeries},
};

/// Default counter-jump tolerance.
pub const DEFAULT_STEP_TOL: f64 = 1e-6;

/// DetectOptions — configuration for step-counter segmentation.
///
/// Fields
/// ------
/// - `num_per_cycle`: number of boundary groups K (≥ 1).
/// - `num_skip`: change indices dropped before grouping.
/// - `tol`: minimum counter jump that counts as a change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectOptions {
    pub num_per_cycle: usize,
    pub num_skip: usize,
    pub tol: f64,
}

impl DetectOptions {
    /// Errors
    /// ------
    /// - `CycleError::InvalidPointsPerCycle` if `num_per_cycle == 0`.
    /// - `CycleError::InvalidTolerance` if `tol` is negative or non-finite.
    pub fn new(num_per_cycle: usize, num_skip: usize, tol: f64) -> CycleResult<Self> {
        if num_per_cycle == 0 {
            return Err(CycleError::InvalidPointsPerCycle { value: num_per_cycle });
        }
        if !tol.is_finite() || tol < 0.0 {
            return Err(CycleError::InvalidTolerance { value: tol });
        }
        Ok(DetectOptions { num_per_cycle, num_skip, tol })
    }
}

impl Default for DetectOptions {
    /// Two boundaries per cycle, nothing skipped.
    fn default() -> Self {
        DetectOptions { num_per_cycle: 2, num_skip: 0, tol: DEFAULT_STEP_TOL }
    }
}

/// Indices where the step counter changes.
///
/// Returns `[0]` followed by every `i >= 1` with `stp[i] - stp[i-1] > tol`.
/// An empty counter yields an empty vector.
pub fn step_change_indices(stp: ArrayView1<'_, f64>, tol: f64) -> Vec<usize> {
    if stp.is_empty() {
        return Vec::new();
    }
    std::iter::once(0).chain((1..stp.len()).filter(|&i| stp[i] - stp[i - 1] > tol)).collect()
}

/// Group step-counter changes into K round-robin boundary groups.
///
/// Parameters
/// ----------
/// - `stp`: `ArrayView1<f64>`
///   Non-decreasing step counter.
/// - `opts`: `&DetectOptions`
///   K, number of change indices to skip, and the jump tolerance.
///
/// Returns
/// -------
/// `CycleResult<SegmentBoundaryGroups>`
///   Group `i` contains the change indices at positions `p` with
///   `p mod K == i` after skipping. Trailing groups may be empty.
///
/// Errors
/// ------
/// - `CycleError::InvalidPointsPerCycle` if `opts.num_per_cycle == 0`.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_cyclic::cycle::detect::{DetectOptions, detect};
/// let stp = array![0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.1, 2.1, 2.1, 2.3, 10.0, 12.0, 12.0, 14.0];
/// let groups = detect(stp.view(), &DetectOptions::default()).unwrap();
/// assert_eq!(groups.groups(), &[vec![0, 4, 9, 11], vec![1, 6, 10, 13]]);
/// ```
pub fn detect(stp: ArrayView1<'_, f64>, opts: &DetectOptions) -> CycleResult<SegmentBoundaryGroups> {
    let k = opts.num_per_cycle;
    if k == 0 {
        return Err(CycleError::InvalidPointsPerCycle { value: k });
    }
    let changes = step_change_indices(stp, opts.tol);
    let mut groups = vec![Vec::new(); k];
    for (position, &index) in changes.iter().skip(opts.num_skip).enumerate() {
        groups[position % k].push(index);
    }
    debug!(changes = changes.len(), groups = k, "detected step-counter boundaries");
    SegmentBoundaryGroups::new(groups)
}

/// Detect boundaries whose distance from the previous boundary is large enough.
///
/// Parameters
/// ----------
/// - `series`: `&TimeSeries` holding at least `stp`.
/// - `min_change`: `f64`
///   A candidate is accepted only if `metric(series, last, candidate)` is
///   strictly greater than this value.
/// - `metric`: `Fn(&TimeSeries, usize, usize) -> f64`
///   Distance between the last accepted boundary and a candidate.
/// - `num_per_cycle`: K ≥ 1.
///
/// Returns
/// -------
/// `CycleResult<SegmentBoundaryGroups>` seeded with index 0 in group 0.
///
/// Errors
/// ------
/// - `CycleError::InvalidPointsPerCycle` if `num_per_cycle == 0`.
/// - `CycleError::InvalidMinChange` if `min_change` is negative or non-finite.
/// - `CycleError::Data` if `stp` is missing.
pub fn detect_by_metric<F>(
    series: &TimeSeries, min_change: f64, metric: F, num_per_cycle: usize,
) -> CycleResult<SegmentBoundaryGroups>
where
    F: Fn(&TimeSeries, usize, usize) -> f64,
{
    if num_per_cycle == 0 {
        return Err(CycleError::InvalidPointsPerCycle { value: num_per_cycle });
    }
    if !min_change.is_finite() || min_change < 0.0 {
        return Err(CycleError::InvalidMinChange { value: min_change });
    }
    let changes = step_change_indices(series.channel(STP)?.view(), DEFAULT_STEP_TOL);

    let mut groups = vec![Vec::new(); num_per_cycle];
    let Some((&first, candidates)) = changes.split_first() else {
        return SegmentBoundaryGroups::new(groups);
    };
    groups[0].push(first);
    let mut last = first;
    let mut slot = 1 % num_per_cycle;
    for &candidate in candidates {
        if metric(series, last, candidate) > min_change {
            groups[slot].push(candidate);
            last = candidate;
            slot = (slot + 1) % num_per_cycle;
        }
    }
    SegmentBoundaryGroups::new(groups)
}

/// [`detect_by_metric`] with the von Mises strain distance.
///
/// Requires `eps`, `gam` and `stp`; the distance between samples `a` and `b`
/// is `sqrt((eps[b]-eps[a])² + (gam[b]-gam[a])²/3)`.
pub fn detect_by_strain_change(
    series: &TimeSeries, min_change: f64, num_per_cycle: usize,
) -> CycleResult<SegmentBoundaryGroups> {
    let eps = series.channel(EPS)?;
    let gam = series.channel(GAM)?;
    detect_by_metric(
        series,
        min_change,
        |_, a, b| {
            let de = eps[b] - eps[a];
            let dg = gam[b] - gam[a];
            (de * de + dg * dg / 3.0).sqrt()
        },
        num_per_cycle,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::TIME;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Change-index extraction from a float step counter.
    // - Round-robin grouping for K = 1, 2, 3 with skipping.
    // - Metric-based detection with the strain distance.
    //
    // They intentionally DO NOT cover:
    // - Segment pairing, which is tested in `groups`.
    // -------------------------------------------------------------------------

    fn step_counter() -> Array1<f64> {
        array![0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.1, 2.1, 2.1, 2.3, 10.0, 12.0, 12.0, 14.0]
    }

    #[test]
    // Purpose
    // -------
    // Every counter jump above the tolerance is reported after index 0.
    //
    // Given
    // -----
    // - A float step counter with jumps of 1, 1, 0.1, 0.2, 7.7, 2, 2.
    //
    // Expect
    // ------
    // - [0, 1, 4, 6, 9, 10, 11, 13] for K = 1.
    fn detect_single_group_lists_all_changes() {
        // Arrange
        let stp = step_counter();
        let opts = DetectOptions::new(1, 0, DEFAULT_STEP_TOL).unwrap();

        // Act
        let groups = detect(stp.view(), &opts).unwrap();

        // Assert
        assert_eq!(groups.groups(), &[vec![0, 1, 4, 6, 9, 10, 11, 13]]);
    }

    #[test]
    // Purpose
    // -------
    // Changes are split round-robin by position for K = 2 and K = 3.
    fn detect_splits_round_robin() {
        let stp = step_counter();

        let two = detect(stp.view(), &DetectOptions::new(2, 0, DEFAULT_STEP_TOL).unwrap()).unwrap();
        let three =
            detect(stp.view(), &DetectOptions::new(3, 1, DEFAULT_STEP_TOL).unwrap()).unwrap();

        assert_eq!(two.groups(), &[vec![0, 4, 9, 11], vec![1, 6, 10, 13]]);
        assert_eq!(three.groups(), &[vec![1, 9, 13], vec![4, 10], vec![6, 11]]);
    }

    #[test]
    // Purpose
    // -------
    // Skipping more changes than exist leaves all groups empty.
    fn detect_skip_past_end_gives_empty_groups() {
        let stp = step_counter();
        let opts = DetectOptions::new(2, 20, DEFAULT_STEP_TOL).unwrap();

        let groups = detect(stp.view(), &opts).unwrap();

        assert_eq!(groups.num_boundaries(), 0);
        assert_eq!(groups.num_groups(), 2);
    }

    #[test]
    fn detect_options_reject_zero_groups() {
        assert_eq!(
            DetectOptions::new(0, 0, DEFAULT_STEP_TOL).unwrap_err(),
            CycleError::InvalidPointsPerCycle { value: 0 }
        );
        assert!(DetectOptions::new(2, 0, -1.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Strain-based detection rejects candidates that barely move in strain
    // space and keeps alternating groups for accepted ones.
    //
    // Given
    // -----
    // - stp = [0,0,0,1,1,2,2,3,3,4,5,5] (changes at 0, 3, 5, 7, 9, 10).
    // - eps = v/√2, gam = v/√6 for v = [0,0,0,0.1,0.5,1,1,1,1.5,1.5,2,3].
    // - min_change = 0.2, K = 2.
    //
    // Expect
    // ------
    // - Groups [[0, 9], [5, 10]].
    fn detect_by_strain_change_skips_small_moves() {
        // Arrange
        let v = array![0.0, 0.0, 0.0, 0.1, 0.5, 1.0, 1.0, 1.0, 1.5, 1.5, 2.0, 3.0];
        let series = TimeSeries::from_pairs([
            (TIME, Array1::linspace(0.0, 11.0, 12)),
            (STP, array![0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 5.0, 5.0]),
            (EPS, v.mapv(|x| x / 2f64.sqrt())),
            (GAM, v.mapv(|x| x / 6f64.sqrt())),
        ])
        .unwrap();

        // Act
        let groups = detect_by_strain_change(&series, 0.2, 2).unwrap();

        // Assert
        assert_eq!(groups.groups(), &[vec![0, 9], vec![5, 10]]);
    }

    #[test]
    // Purpose
    // -------
    // A single group works with metric-based detection (every accepted
    // boundary lands in group 0).
    fn detect_by_metric_single_group() {
        let series = TimeSeries::from_pairs([
            (STP, array![0.0, 1.0, 2.0, 3.0]),
            (EPS, array![0.0, 0.5, 0.6, 2.0]),
        ])
        .unwrap();

        let eps = series.channel(EPS).unwrap().clone();
        let groups =
            detect_by_metric(&series, 0.3, |_, a, b| (eps[b] - eps[a]).abs(), 1).unwrap();

        assert_eq!(groups.groups(), &[vec![0, 1, 3]]);
    }
}
