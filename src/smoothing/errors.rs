//! Errors for the local and global smoothing engines.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{data::errors::DataError, error_kind::ErrorKind, numerics::errors::NumericsError};

/// Result alias for smoothing operations.
pub type SmoothingResult<T> = Result<T, SmoothingError>;

#[derive(Debug, Clone, PartialEq)]
pub enum SmoothingError {
    // ---- Model state ----
    /// A spline was evaluated before `fit` succeeded.
    ModelNotFitted,

    // ---- Filter configuration ----
    /// Too few samples for the requested number of linear segments.
    TooFewSamples { samples: usize, segments: usize },

    /// Knot fraction must be finite and in `(0, 1]`.
    InvalidKnotFraction { value: f64 },

    /// Abscissa and ordinate differ in length.
    LengthMismatch { t_len: usize, v_len: usize },

    /// A selected channel has no filter in a per-channel specification.
    MissingFilter { channel: String },

    // ---- Global basis ----
    /// `knot_order` must be at least `cycle_order`.
    InvalidOrders { knot_order: usize, cycle_order: usize },

    /// Knot fractions must be finite and within `[0, 1]`.
    InvalidKnotPosition { index: usize, value: f64 },

    /// The global basis needs at least two cycle times.
    TooFewCycleTimes { count: usize },

    /// Cycle times must be finite.
    InvalidCycleTime { index: usize, value: f64 },

    /// The time channel spans zero duration.
    DegenerateTimeSpan { start: f64, end: f64 },

    // ---- Bounds ----
    /// A boundary index lies outside the series.
    IndexOutOfRange { index: usize, len: usize },

    // ---- Wrapped ----
    Data(DataError),
    Numerics(NumericsError),
}

impl SmoothingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SmoothingError::ModelNotFitted => ErrorKind::State,
            SmoothingError::TooFewSamples { .. }
            | SmoothingError::InvalidKnotFraction { .. }
            | SmoothingError::LengthMismatch { .. }
            | SmoothingError::MissingFilter { .. }
            | SmoothingError::InvalidOrders { .. }
            | SmoothingError::InvalidKnotPosition { .. }
            | SmoothingError::TooFewCycleTimes { .. }
            | SmoothingError::InvalidCycleTime { .. } => ErrorKind::Configuration,
            SmoothingError::DegenerateTimeSpan { .. } => ErrorKind::Data,
            SmoothingError::IndexOutOfRange { .. } => ErrorKind::Bounds,
            SmoothingError::Data(err) => err.kind(),
            SmoothingError::Numerics(err) => err.kind(),
        }
    }
}

impl std::error::Error for SmoothingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SmoothingError::Data(err) => Some(err),
            SmoothingError::Numerics(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for SmoothingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Model state ----
            SmoothingError::ModelNotFitted => {
                write!(f, "Spline model must be fitted before evaluation")
            }

            // ---- Filter configuration ----
            SmoothingError::TooFewSamples { samples, segments } => write!(
                f,
                "Cannot fit {segments} linear segments to {samples} samples: need more samples \
                 than segments"
            ),
            SmoothingError::InvalidKnotFraction { value } => {
                write!(f, "Invalid knot fraction {value}: must be finite and in (0, 1]")
            }
            SmoothingError::LengthMismatch { t_len, v_len } => {
                write!(f, "Abscissa length {t_len} does not match ordinate length {v_len}")
            }
            SmoothingError::MissingFilter { channel } => {
                write!(f, "No filter given for channel '{channel}'")
            }

            // ---- Global basis ----
            SmoothingError::InvalidOrders { knot_order, cycle_order } => write!(
                f,
                "Knot order {knot_order} must be greater than or equal to cycle order {cycle_order}"
            ),
            SmoothingError::InvalidKnotPosition { index, value } => {
                write!(f, "Invalid knot fraction at index {index}: {value}, must be in [0, 1]")
            }
            SmoothingError::TooFewCycleTimes { count } => {
                write!(f, "At least two cycle times are required, got {count}")
            }
            SmoothingError::InvalidCycleTime { index, value } => write!(
                f,
                "Invalid cycle time at index {index}: {value}, must be finite"
            ),
            SmoothingError::DegenerateTimeSpan { start, end } => {
                write!(f, "Time channel spans zero duration ({start} to {end})")
            }

            // ---- Bounds ----
            SmoothingError::IndexOutOfRange { index, len } => {
                write!(f, "Boundary index {index} out of range for series of length {len}")
            }

            // ---- Wrapped ----
            SmoothingError::Data(err) => write!(f, "{err}"),
            SmoothingError::Numerics(err) => write!(f, "{err}"),
        }
    }
}

impl From<DataError> for SmoothingError {
    fn from(err: DataError) -> Self {
        SmoothingError::Data(err)
    }
}

impl From<NumericsError> for SmoothingError {
    fn from(err: NumericsError) -> Self {
        SmoothingError::Numerics(err)
    }
}

/// Convert a [`SmoothingError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl From<SmoothingError> for PyErr {
    fn from(err: SmoothingError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
