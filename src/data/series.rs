//! TimeSeries — validated container of equal-length test channels.
//!
//! Purpose
//! -------
//! Hold the per-timestep channels of one cyclic test (`time`, `sig`, `eps`,
//! `tau`, `gam`, `stp`, and any extra channels the caller carries along) and
//! enforce the basic shape and value invariants once, at construction time,
//! so the analysis modules can index freely.
//!
//! Key behaviors
//! -------------
//! - Store channels in a `BTreeMap` keyed by name; iteration order is the
//!   lexical order of channel names and is therefore deterministic.
//! - Validate on construction and on every insertion: equal lengths, at least
//!   one sample, finite values, non-decreasing `time` and `stp`.
//! - Provide the small set of derived views the pipeline needs: truncation to
//!   a prefix, bounds checks and linear interpolation of every channel between
//!   two neighbouring samples.
//!
//! Invariants & assumptions
//! ------------------------
//! - `len >= 1` and every channel has exactly `len` samples.
//! - Values are finite; `time` and `stp` never decrease.
//! - Instances are never mutated by analysis routines; smoothing and other
//!   transformations return fresh series.
//!
//! Conventions
//! -----------
//! - Channel names are plain strings; the standard names are exported as
//!   constants ([`TIME`], [`SIG`], ...).
//! - Sample indices are zero-based.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each validation failure, prefix truncation and
//!   interpolation between samples.
use std::collections::BTreeMap;

use ndarray::{Array1, s};

use crate::data::errors::{DataError, DataResult};

/// Test time.
pub const TIME: &str = "time";
/// Axial (normal) stress.
pub const SIG: &str = "sig";
/// Axial strain.
pub const EPS: &str = "eps";
/// Shear stress.
pub const TAU: &str = "tau";
/// Engineering shear strain.
pub const GAM: &str = "gam";
/// Monotonic step counter.
pub const STP: &str = "stp";

/// Channels that must never decrease.
const MONOTONIC_CHANNELS: [&str; 2] = [TIME, STP];

/// TimeSeries — named, equal-length, finite channels of one test.
///
/// Fields
/// ------
/// - `channels`: `BTreeMap<String, Array1<f64>>`
///   Channel name to samples.
/// - `len`: `usize`
///   Common channel length N (≥ 1).
///
/// Invariants
/// ----------
/// - At least one channel; all channels have length `len >= 1`.
/// - Every value is finite.
/// - `time` and `stp`, when present, are non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    channels: BTreeMap<String, Array1<f64>>,
    len: usize,
}

impl TimeSeries {
    /// Construct a validated series from a channel map.
    ///
    /// Parameters
    /// ----------
    /// - `channels`: `BTreeMap<String, Array1<f64>>`
    ///   Channel name to samples. All arrays must share one non-zero length.
    ///
    /// Returns
    /// -------
    /// `DataResult<TimeSeries>`
    ///
    /// Errors
    /// ------
    /// - `DataError::NoChannels` when the map is empty.
    /// - `DataError::EmptySeries` when channels have zero samples.
    /// - `DataError::LengthMismatch` for the first channel whose length
    ///   differs from the reference length. The reference is the channel
    ///   whose name sorts first, not the first one inserted.
    /// - `DataError::NonFiniteData` for the first NaN/±∞ value.
    /// - `DataError::NonMonotonic` if `time` or `stp` decreases.
    pub fn new(channels: BTreeMap<String, Array1<f64>>) -> DataResult<Self> {
        let len = channels.values().next().map(|c| c.len()).ok_or(DataError::NoChannels)?;
        if len == 0 {
            return Err(DataError::EmptySeries);
        }
        for (name, values) in &channels {
            validate_channel(name, values, len)?;
        }
        Ok(TimeSeries { channels, len })
    }

    /// Construct a series from `(name, samples)` pairs.
    ///
    /// A repeated name keeps the last samples supplied for it.
    pub fn from_pairs<I, S>(pairs: I) -> DataResult<Self>
    where
        I: IntoIterator<Item = (S, Array1<f64>)>,
        S: Into<String>,
    {
        TimeSeries::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for a constructed series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Channel names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.channels.keys().map(String::as_str)
    }

    /// `(name, samples)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array1<f64>)> + '_ {
        self.channels.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&Array1<f64>> {
        self.channels.get(name)
    }

    /// Look up a channel, failing with `DataError::MissingChannel`.
    pub fn channel(&self, name: &str) -> DataResult<&Array1<f64>> {
        self.channels.get(name).ok_or_else(|| DataError::MissingChannel { name: name.to_string() })
    }

    /// Shorthand for `channel(TIME)`.
    pub fn time(&self) -> DataResult<&Array1<f64>> {
        self.channel(TIME)
    }

    /// Insert or replace a channel after validating it.
    ///
    /// Returns the previous samples stored under `name`, if any.
    ///
    /// Errors
    /// ------
    /// Same checks as [`TimeSeries::new`] for the single channel.
    pub fn insert(
        &mut self, name: impl Into<String>, values: Array1<f64>,
    ) -> DataResult<Option<Array1<f64>>> {
        let name = name.into();
        validate_channel(&name, &values, self.len)?;
        Ok(self.channels.insert(name, values))
    }

    /// Copy of the first `n` samples of every channel (`n` is clamped to `len`).
    ///
    /// Errors
    /// ------
    /// - `DataError::InvalidTruncation` if `n == 0`.
    pub fn truncated(&self, n: usize) -> DataResult<TimeSeries> {
        if n == 0 {
            return Err(DataError::InvalidTruncation { n });
        }
        let n = n.min(self.len);
        let channels =
            self.channels.iter().map(|(k, v)| (k.clone(), v.slice(s![..n]).to_owned())).collect();
        Ok(TimeSeries { channels, len: n })
    }

    /// Fail with `DataError::IndexOutOfRange` unless `index < len`.
    pub fn check_index(&self, index: usize) -> DataResult<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(DataError::IndexOutOfRange { index, len: self.len })
        }
    }

    /// Linearly interpolate every channel between two samples.
    ///
    /// Parameters
    /// ----------
    /// - `lower`, `upper`: sample indices (both `< len`).
    /// - `fraction`: weight of `upper`; `0` returns the `lower` sample, `1`
    ///   the `upper` sample.
    ///
    /// Returns
    /// -------
    /// `DataResult<BTreeMap<String, f64>>` with one value per channel.
    pub fn interpolate(
        &self, lower: usize, upper: usize, fraction: f64,
    ) -> DataResult<BTreeMap<String, f64>> {
        self.check_index(lower)?;
        self.check_index(upper)?;
        Ok(self
            .channels
            .iter()
            .map(|(k, v)| (k.clone(), v[lower] + (v[upper] - v[lower]) * fraction))
            .collect())
    }
}

fn validate_channel(name: &str, values: &Array1<f64>, len: usize) -> DataResult<()> {
    if values.len() != len {
        return Err(DataError::LengthMismatch {
            channel: name.to_string(),
            expected: len,
            actual: values.len(),
        });
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(DataError::NonFiniteData { channel: name.to_string(), index, value });
    }
    if MONOTONIC_CHANNELS.contains(&name) {
        if let Some(index) = (1..values.len()).find(|&i| values[i] < values[i - 1]) {
            return Err(DataError::NonMonotonic { channel: name.to_string(), index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction-time validation of lengths, finiteness and monotonicity.
    // - Channel lookup, insertion and prefix truncation.
    // - Interpolation of all channels between two samples.
    // -------------------------------------------------------------------------

    fn sample_series() -> TimeSeries {
        TimeSeries::from_pairs([
            (TIME, array![0.0, 1.0, 2.0, 3.0]),
            (SIG, array![0.0, 10.0, 20.0, 10.0]),
            (STP, array![0.0, 0.0, 1.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A well-formed set of channels is accepted unchanged.
    //
    // Given
    // -----
    // - Three channels of length 4 with monotone `time` and `stp`.
    //
    // Expect
    // ------
    // - `len == 4`, three channels, lookups return the stored samples.
    fn new_accepts_consistent_channels() {
        // Arrange / Act
        let series = sample_series();

        // Assert
        assert_eq!(series.len(), 4);
        assert_eq!(series.num_channels(), 3);
        assert_eq!(series.channel(SIG).unwrap(), &array![0.0, 10.0, 20.0, 10.0]);
        assert!(series.get(EPS).is_none());
        assert_eq!(series.names().collect::<Vec<_>>(), vec![SIG, STP, TIME]);
    }

    #[test]
    // Purpose
    // -------
    // Each invariant violation maps to its dedicated error variant.
    fn new_rejects_invalid_channels() {
        assert_eq!(TimeSeries::new(BTreeMap::new()).unwrap_err(), DataError::NoChannels);

        let err = TimeSeries::from_pairs([(TIME, array![0.0, 1.0]), (SIG, array![1.0])])
            .unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch { channel: TIME.to_string(), expected: 1, actual: 2 }
        );

        let err = TimeSeries::from_pairs([(SIG, array![1.0, f64::NAN])]).unwrap_err();
        assert!(matches!(err, DataError::NonFiniteData { index: 1, .. }));

        let err = TimeSeries::from_pairs([(TIME, array![0.0, 2.0, 1.0])]).unwrap_err();
        assert_eq!(err, DataError::NonMonotonic { channel: TIME.to_string(), index: 2 });

        let err = TimeSeries::from_pairs([(SIG, Array1::<f64>::zeros(0))]).unwrap_err();
        assert_eq!(err, DataError::EmptySeries);
    }

    #[test]
    // Purpose
    // -------
    // The reference length comes from the channel whose name sorts first,
    // whatever order the pairs are supplied in.
    //
    // Given
    // -----
    // - `eps` with 3 samples and `time` with 2, supplied in both orders.
    //
    // Expect
    // ------
    // - Both orders blame `time` against the length of `eps`.
    fn length_reference_follows_name_order() {
        // Arrange
        let short = || (TIME, array![0.0, 1.0]);
        let long = || (EPS, array![0.0, 1.0, 2.0]);
        let expected =
            DataError::LengthMismatch { channel: TIME.to_string(), expected: 3, actual: 2 };

        // Act
        let time_first = TimeSeries::from_pairs([short(), long()]).unwrap_err();
        let eps_first = TimeSeries::from_pairs([long(), short()]).unwrap_err();

        // Assert
        assert_eq!(time_first, expected);
        assert_eq!(eps_first, expected);
    }

    #[test]
    // Purpose
    // -------
    // Missing lookups and out-of-range indices are errors, not panics.
    fn lookup_and_index_errors() {
        let series = sample_series();

        assert_eq!(
            series.channel(GAM).unwrap_err(),
            DataError::MissingChannel { name: GAM.to_string() }
        );
        assert!(series.check_index(3).is_ok());
        assert_eq!(series.check_index(4).unwrap_err(), DataError::IndexOutOfRange { index: 4, len: 4 });
    }

    #[test]
    // Purpose
    // -------
    // Insertion validates the new channel against the series length.
    fn insert_validates_length() {
        let mut series = sample_series();

        assert!(series.insert(EPS, array![0.0, 1.0]).is_err());
        let previous = series.insert(EPS, array![0.0, 1e-3, 2e-3, 1e-3]).unwrap();

        assert!(previous.is_none());
        assert!(series.contains(EPS));
    }

    #[test]
    // Purpose
    // -------
    // Truncation keeps a prefix of every channel and clamps to the length.
    fn truncated_keeps_prefix() {
        let series = sample_series();

        let short = series.truncated(2).unwrap();
        let clamped = series.truncated(100).unwrap();

        assert_eq!(short.len(), 2);
        assert_eq!(short.channel(SIG).unwrap(), &array![0.0, 10.0]);
        assert_eq!(clamped.len(), 4);
        assert!(series.truncated(0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Interpolation weights the upper sample by `fraction` for every channel.
    fn interpolate_all_channels() {
        let series = sample_series();

        let mid = series.interpolate(1, 2, 0.25).unwrap();

        assert_relative_eq!(mid[TIME], 1.25);
        assert_relative_eq!(mid[SIG], 12.5);
        assert_relative_eq!(mid[STP], 0.25);
        assert!(series.interpolate(3, 4, 0.5).is_err());
    }
}
