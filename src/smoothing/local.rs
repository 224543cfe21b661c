//! local — segment-wise smoothing of test channels.
//!
//! Purpose
//! -------
//! Smooth each channel independently between consecutive segment boundaries
//! so that the fitted curves never blend data across a load reversal.
//!
//! Key behaviors
//! -------------
//! - Flatten and sort all boundaries, prepend 0 and extend the last boundary
//!   by one sample; every `[start, end)` window between consecutive entries is
//!   fitted on its own with the channel's [`LocalFilter`] against `time`.
//! - Boundary samples open the following window, except the last boundary
//!   which closes the final window.
//! - Samples after the last boundary are copied unchanged.
//! - [`FilterSpec`] resolves once into a per-channel filter list before any
//!   fitting happens.
//!
//! Invariants & assumptions
//! ------------------------
//! - The input series is never modified; a fresh series is returned.
//! - Every boundary lies inside the series, otherwise a bounds error is
//!   returned before any work is done.
//!
//! Testing notes
//! -------------
//! - Unit tests check that window edges follow the boundaries, that
//!   unselected channels are untouched and the filter-resolution rules.
use std::collections::BTreeMap;

use ndarray::s;
use tracing::debug;

use crate::{
    cycle::groups::SegmentBoundaryGroups,
    data::{selection::ChannelSelection, series::TimeSeries},
    smoothing::{
        errors::{SmoothingError, SmoothingResult},
        filters::LocalFilter,
    },
};

/// Which filter applies to which channel.
#[derive(Debug, Clone)]
pub enum FilterSpec {
    /// One filter for every selected channel.
    Uniform(LocalFilter),
    /// Filter per channel name.
    PerChannel(BTreeMap<String, LocalFilter>),
}

impl FilterSpec {
    /// Resolve to `(channel, filter)` pairs.
    ///
    /// Rules
    /// -----
    /// - `Uniform` with no selection: the default selection (all except
    ///   `time` and `stp`).
    /// - `PerChannel` with no selection: the map's keys.
    /// - An explicit selection: those channels; with `PerChannel` each must
    ///   have a filter.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::MissingFilter` for a selected channel without filter.
    /// - `SmoothingError::Data(MissingChannel)` for an unknown channel.
    pub fn resolve(
        &self, series: &TimeSeries, channels: Option<&ChannelSelection>,
    ) -> SmoothingResult<Vec<(String, LocalFilter)>> {
        match (self, channels) {
            (FilterSpec::Uniform(filter), selection) => {
                let names = match selection {
                    Some(sel) => sel.resolve(series)?,
                    None => ChannelSelection::default().resolve(series)?,
                };
                Ok(names.into_iter().map(|name| (name, *filter)).collect())
            }
            (FilterSpec::PerChannel(map), None) => {
                for name in map.keys() {
                    series.channel(name)?;
                }
                Ok(map.iter().map(|(k, f)| (k.clone(), *f)).collect())
            }
            (FilterSpec::PerChannel(map), Some(sel)) => sel
                .resolve(series)?
                .into_iter()
                .map(|name| match map.get(&name) {
                    Some(filter) => Ok((name, *filter)),
                    None => Err(SmoothingError::MissingFilter { channel: name }),
                })
                .collect(),
        }
    }
}

/// LocalSmoother — applies local filters between segment boundaries.
///
/// Fields
/// ------
/// - `spec`: [`FilterSpec`] choosing the filter per channel.
/// - `channels`: optional explicit [`ChannelSelection`].
#[derive(Debug, Clone)]
pub struct LocalSmoother {
    spec: FilterSpec,
    channels: Option<ChannelSelection>,
}

impl LocalSmoother {
    pub fn new(spec: FilterSpec) -> Self {
        LocalSmoother { spec, channels: None }
    }

    /// Restrict smoothing to an explicit channel selection.
    pub fn with_channels(mut self, channels: ChannelSelection) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Smooth the selected channels window by window.
    ///
    /// Parameters
    /// ----------
    /// - `series`: `&TimeSeries` with a `time` channel.
    /// - `groups`: `&SegmentBoundaryGroups` from segment detection.
    ///
    /// Returns
    /// -------
    /// `SmoothingResult<TimeSeries>`
    ///   Copy of `series` with smoothed values for the selected channels.
    ///   Without any boundary the copy is returned unchanged.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::IndexOutOfRange` if a boundary is `>= series.len()`.
    /// - Filter resolution errors (see [`FilterSpec::resolve`]).
    /// - Any filter error (too few samples, failed solve).
    pub fn smooth(
        &self, series: &TimeSeries, groups: &SegmentBoundaryGroups,
    ) -> SmoothingResult<TimeSeries> {
        let len = series.len();
        let mut bounds = groups.flattened();
        let Some(&last) = bounds.last() else {
            debug!("no segment boundaries, returning series unchanged");
            return Ok(series.clone());
        };
        if last >= len {
            return Err(SmoothingError::IndexOutOfRange { index: last, len });
        }
        bounds.insert(0, 0);
        if let Some(end) = bounds.last_mut() {
            *end += 1;
        }

        let filters = self.spec.resolve(series, self.channels.as_ref())?;
        let time = series.time()?;
        let mut out = series.clone();
        for (name, filter) in filters {
            let values = series.channel(&name)?;
            let mut smoothed = values.clone();
            for window in bounds.windows(2) {
                let (i0, i1) = (window[0], window[1]);
                if i1 <= i0 {
                    continue;
                }
                let fitted =
                    filter.apply(time.slice(s![i0..i1]), values.slice(s![i0..i1]))?;
                smoothed.slice_mut(s![i0..i1]).assign(&fitted);
            }
            out.insert(name, smoothed)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::{SIG, STP, TIME};
    use crate::smoothing::filters::KnotCount;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, ArrayView1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Window construction from boundaries (leading 0, last boundary + 1).
    // - Channel selection and per-channel filter resolution.
    //
    // They intentionally DO NOT cover:
    // - Filter accuracy, which is tested in `filters`.
    // -------------------------------------------------------------------------

    fn window_mean(
        _t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>, t_pred: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        let mean = v.mean().unwrap_or(0.0);
        Array1::from_elem(t_pred.len(), mean)
    }

    fn series() -> TimeSeries {
        TimeSeries::from_pairs([
            (TIME, Array1::linspace(0.0, 7.0, 8)),
            (STP, array![0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]),
            (SIG, array![1.0, 3.0, 10.0, 20.0, 30.0, 5.0, 7.0, 9.0]),
        ])
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Windows are [0, b1), [b1, b2), …, [b_(n-1), b_n + 1); later samples
    // stay untouched.
    //
    // Given
    // -----
    // - Boundaries [[0, 5], [2]] (flattened 0, 2, 5) and a window-mean filter.
    //
    // Expect
    // ------
    // - Windows [0,2) and [2,6): means 2 and 16.25; samples 6 and 7 copied.
    fn windows_follow_boundaries() {
        // Arrange
        let groups = SegmentBoundaryGroups::new(vec![vec![0, 5], vec![2]]).unwrap();
        let smoother = LocalSmoother::new(FilterSpec::Uniform(LocalFilter::Custom(window_mean)));

        // Act
        let out = smoother.smooth(&series(), &groups).unwrap();

        // Assert
        assert_eq!(out.channel(SIG).unwrap(), &array![2.0, 2.0, 16.25, 16.25, 16.25, 16.25, 7.0, 9.0]);
        assert_eq!(out.channel(STP).unwrap(), series().channel(STP).unwrap());
        assert_eq!(out.time().unwrap(), series().time().unwrap());
    }

    #[test]
    // Purpose
    // -------
    // Linear channels survive a linear-segment filter window by window.
    fn linear_channel_survives_segment_fits() {
        let t = Array1::linspace(0.0, 9.0, 10);
        let data = TimeSeries::from_pairs([(TIME, t.clone()), ("x", t.mapv(|v| 2.0 * v - 1.0))])
            .unwrap();
        let groups = SegmentBoundaryGroups::new(vec![vec![0, 6], vec![3]]).unwrap();
        let smoother = LocalSmoother::new(FilterSpec::Uniform(LocalFilter::polynomial(1)));

        let out = smoother.smooth(&data, &groups).unwrap();

        for (a, b) in out.channel("x").unwrap().iter().zip(data.channel("x").unwrap().iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Without boundaries the series is returned unchanged; out-of-range
    // boundaries are rejected.
    fn empty_and_out_of_range_boundaries() {
        let smoother = LocalSmoother::new(FilterSpec::Uniform(LocalFilter::polynomial(1)));
        let empty = SegmentBoundaryGroups::new(vec![vec![], vec![]]).unwrap();
        let outside = SegmentBoundaryGroups::new(vec![vec![0, 8]]).unwrap();

        assert_eq!(smoother.smooth(&series(), &empty).unwrap(), series());
        assert_eq!(
            smoother.smooth(&series(), &outside).unwrap_err(),
            SmoothingError::IndexOutOfRange { index: 8, len: 8 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Per-channel specifications default to their own keys and require a
    // filter for every explicitly selected channel.
    fn per_channel_resolution_rules() {
        let data = series();
        let mut map = BTreeMap::new();
        map.insert(SIG.to_string(), LocalFilter::linear_segments(KnotCount::Count(1)));
        let spec = FilterSpec::PerChannel(map);

        let resolved = spec.resolve(&data, None).unwrap();
        let err = spec.resolve(&data, Some(&ChannelSelection::only([STP]))).unwrap_err();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, SIG);
        assert_eq!(err, SmoothingError::MissingFilter { channel: STP.to_string() });
    }

    #[test]
    fn uniform_resolution_uses_default_selection() {
        let data = series();
        let spec = FilterSpec::Uniform(LocalFilter::polynomial(3));

        let names: Vec<String> =
            spec.resolve(&data, None).unwrap().into_iter().map(|(n, _)| n).collect();

        assert_eq!(names, vec![SIG.to_string()]);
    }
}
