//! Errors for von Mises metrics, compliance identification and yield points.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{data::errors::DataError, error_kind::ErrorKind, numerics::errors::NumericsError};

/// Result alias for mechanics operations.
pub type MechanicsResult<T> = Result<T, MechanicsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MechanicsError {
    // ---- Compliance options ----
    /// Anisotropic compliance needs both the axial and the shear component.
    AnisotropicNeedsBoth,

    /// At least one of axial and shear must be requested.
    NoComponents,

    // ---- Yield options ----
    /// Yield offset must be finite and positive.
    InvalidOffset { value: f64 },

    /// Elastic stress window must be finite with `min < max`.
    InvalidStressWindow { min: f64, max: f64 },

    // ---- Bounds ----
    /// Index window is empty.
    EmptyWindow { start: usize, end: usize },

    /// Index window ends beyond the series.
    WindowOutOfRange { end: usize, len: usize },

    /// No sample in the window exceeds the threshold.
    ThresholdNotReached { quantity: &'static str, threshold: f64, start: usize, end: usize },

    // ---- Input ----
    /// Paired arrays differ in length.
    LengthMismatch { left: usize, right: usize },

    // ---- Wrapped ----
    Data(DataError),
    Numerics(NumericsError),
}

impl MechanicsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MechanicsError::AnisotropicNeedsBoth
            | MechanicsError::NoComponents
            | MechanicsError::InvalidOffset { .. }
            | MechanicsError::InvalidStressWindow { .. } => ErrorKind::Configuration,
            MechanicsError::EmptyWindow { .. }
            | MechanicsError::WindowOutOfRange { .. }
            | MechanicsError::ThresholdNotReached { .. } => ErrorKind::Bounds,
            MechanicsError::LengthMismatch { .. } => ErrorKind::Data,
            MechanicsError::Data(err) => err.kind(),
            MechanicsError::Numerics(err) => err.kind(),
        }
    }
}

impl std::error::Error for MechanicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MechanicsError::Data(err) => Some(err),
            MechanicsError::Numerics(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for MechanicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Compliance options ----
            MechanicsError::AnisotropicNeedsBoth => write!(
                f,
                "Anisotropic compliance requires both axial and shear components"
            ),
            MechanicsError::NoComponents => {
                write!(f, "At least one of axial and shear compliance must be requested")
            }

            // ---- Yield options ----
            MechanicsError::InvalidOffset { value } => {
                write!(f, "Invalid yield offset {value}: must be finite and positive")
            }
            MechanicsError::InvalidStressWindow { min, max } => write!(
                f,
                "Invalid elastic stress window ({min}, {max}): bounds must be finite with min < max"
            ),

            // ---- Bounds ----
            MechanicsError::EmptyWindow { start, end } => {
                write!(f, "Index window [{start}, {end}) is empty")
            }
            MechanicsError::WindowOutOfRange { end, len } => {
                write!(f, "Index window end {end} exceeds series length {len}")
            }
            MechanicsError::ThresholdNotReached { quantity, threshold, start, end } => write!(
                f,
                "{quantity} never exceeds {threshold} within samples [{start}, {end})"
            ),

            // ---- Input ----
            MechanicsError::LengthMismatch { left, right } => {
                write!(f, "Paired arrays differ in length: {left} vs {right}")
            }

            // ---- Wrapped ----
            MechanicsError::Data(err) => write!(f, "{err}"),
            MechanicsError::Numerics(err) => write!(f, "{err}"),
        }
    }
}

impl From<DataError> for MechanicsError {
    fn from(err: DataError) -> Self {
        MechanicsError::Data(err)
    }
}

impl From<NumericsError> for MechanicsError {
    fn from(err: NumericsError) -> Self {
        MechanicsError::Numerics(err)
    }
}

/// Convert a [`MechanicsError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl From<MechanicsError> for PyErr {
    fn from(err: MechanicsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
