//! Errors for segment detection, boundary groups and aggregation.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{data::errors::DataError, error_kind::ErrorKind};

/// Result alias for cycle-segmentation operations.
pub type CycleResult<T> = Result<T, CycleError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CycleError {
    // ---- Options ----
    /// At least one boundary group per cycle is required.
    InvalidPointsPerCycle { value: usize },

    /// Step-change tolerance must be finite and non-negative.
    InvalidTolerance { value: f64 },

    /// Minimum metric change must be finite and non-negative.
    InvalidMinChange { value: f64 },

    // ---- Boundary groups ----
    /// Boundary groups need at least one group.
    NoGroups,

    /// Group lengths do not follow a round-robin distribution.
    UnbalancedGroups { group: usize, len: usize, first_len: usize },

    /// The round-robin interleave of the groups is not strictly increasing.
    NonIncreasingBoundaries { group: usize, position: usize, index: usize },

    /// A boundary index lies outside the series.
    IndexOutOfRange { index: usize, len: usize },

    // ---- Data ----
    /// Wrapped data-model failure.
    Data(DataError),
}

impl CycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CycleError::InvalidPointsPerCycle { .. }
            | CycleError::InvalidTolerance { .. }
            | CycleError::InvalidMinChange { .. }
            | CycleError::NoGroups
            | CycleError::UnbalancedGroups { .. }
            | CycleError::NonIncreasingBoundaries { .. } => ErrorKind::Configuration,
            CycleError::IndexOutOfRange { .. } => ErrorKind::Bounds,
            CycleError::Data(err) => err.kind(),
        }
    }
}

impl std::error::Error for CycleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CycleError::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Options ----
            CycleError::InvalidPointsPerCycle { value } => {
                write!(f, "Invalid number of boundary points per cycle {value}: must be >= 1")
            }
            CycleError::InvalidTolerance { value } => {
                write!(f, "Invalid step-change tolerance {value}: must be finite and >= 0")
            }
            CycleError::InvalidMinChange { value } => {
                write!(f, "Invalid minimum change {value}: must be finite and >= 0")
            }

            // ---- Boundary groups ----
            CycleError::NoGroups => write!(f, "Boundary groups must contain at least one group"),
            CycleError::UnbalancedGroups { group, len, first_len } => write!(
                f,
                "Boundary group {group} has {len} indices, inconsistent with {first_len} in group 0"
            ),
            CycleError::NonIncreasingBoundaries { group, position, index } => write!(
                f,
                "Boundary index {index} (group {group}, position {position}) does not follow its \
                 predecessor"
            ),
            CycleError::IndexOutOfRange { index, len } => {
                write!(f, "Boundary index {index} out of range for series of length {len}")
            }

            // ---- Data ----
            CycleError::Data(err) => write!(f, "{err}"),
        }
    }
}

impl From<DataError> for CycleError {
    fn from(err: DataError) -> Self {
        CycleError::Data(err)
    }
}

/// Convert a [`CycleError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl From<CycleError> for PyErr {
    fn from(err: CycleError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
