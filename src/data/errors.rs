//! Errors for time-series containers and specimen conversion.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::error_kind::ErrorKind;

/// Result alias for data-model operations.
pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    // ---- Series shape ----
    /// No channels were supplied.
    NoChannels,

    /// Channels were supplied but hold zero samples.
    EmptySeries,

    /// A channel's length differs from the series length.
    LengthMismatch { channel: String, expected: usize, actual: usize },

    // ---- Series values ----
    /// A channel contains NaN or ±∞.
    NonFiniteData { channel: String, index: usize, value: f64 },

    /// `time` or `stp` decreases between `index - 1` and `index`.
    NonMonotonic { channel: String, index: usize },

    // ---- Lookup ----
    /// A requested channel is absent.
    MissingChannel { name: String },

    /// A sample index lies outside `[0, len)`.
    IndexOutOfRange { index: usize, len: usize },

    /// Truncation to zero samples was requested.
    InvalidTruncation { n: usize },

    // ---- Specimen ----
    /// Specimen dimension is non-positive, non-finite, or inconsistent.
    InvalidGeometry { field: &'static str, value: f64, reason: &'static str },
}

impl DataError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::NoChannels
            | DataError::EmptySeries
            | DataError::LengthMismatch { .. }
            | DataError::NonFiniteData { .. }
            | DataError::NonMonotonic { .. } => ErrorKind::Data,
            DataError::MissingChannel { .. }
            | DataError::InvalidTruncation { .. }
            | DataError::InvalidGeometry { .. } => ErrorKind::Configuration,
            DataError::IndexOutOfRange { .. } => ErrorKind::Bounds,
        }
    }
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Series shape ----
            DataError::NoChannels => write!(f, "Time series must contain at least one channel"),
            DataError::EmptySeries => write!(f, "Time series channels must not be empty"),
            DataError::LengthMismatch { channel, expected, actual } => {
                write!(f, "Channel '{channel}' has length {actual}, expected {expected}")
            }

            // ---- Series values ----
            DataError::NonFiniteData { channel, index, value } => {
                write!(f, "Non-finite value in channel '{channel}' at index {index}: {value}")
            }
            DataError::NonMonotonic { channel, index } => {
                write!(f, "Channel '{channel}' decreases at index {index}")
            }

            // ---- Lookup ----
            DataError::MissingChannel { name } => write!(f, "Missing channel '{name}'"),
            DataError::IndexOutOfRange { index, len } => {
                write!(f, "Sample index {index} out of range for series of length {len}")
            }
            DataError::InvalidTruncation { n } => {
                write!(f, "Invalid truncation length {n}: must be at least 1")
            }

            // ---- Specimen ----
            DataError::InvalidGeometry { field, value, reason } => {
                write!(f, "Invalid specimen {field} = {value}: {reason}")
            }
        }
    }
}

/// Convert a [`DataError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl From<DataError> for PyErr {
    fn from(err: DataError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
