use argmin::core::{ArgminError, Error};
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{
    data::errors::DataError, error_kind::ErrorKind, numerics::errors::NumericsError,
    smoothing::errors::SmoothingError,
};

/// Result alias for cycle-time optimization.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- CycleTimeOptions ----
    /// Maximum time change needs to be positive and finite.
    InvalidDtMax { value: f64, reason: &'static str },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    // ---- Cycle times ----
    /// At least two cycle times are needed to define a cycle.
    TooFewCycleTimes { count: usize },

    /// Initial cycle times must be finite.
    InvalidCycleTime { index: usize, value: f64 },

    /// No channel selected for the objective.
    NoChannels,

    // ---- Objective ----
    /// Objective returned a non-finite total error.
    NonFiniteCost { value: f64 },

    // ---- Optimizer outcome ----
    /// The solver finished without a best parameter.
    MissingBestParam,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter { text: String },
    /// Wrapper for argmin::NotImplemented
    NotImplemented { text: String },
    /// Wrapper for argmin::NotInitialized
    NotInitialized { text: String },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated { text: String },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound { text: String },
    /// Wrapper for argmin::PotentialBug
    PotentialBug { text: String },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError { text: String },
    /// Wrapper for other argmin::Error types
    BackendError { text: String },
    /// Unrecognized argmin error variant
    UnknownError,

    // ---- Wrapped ----
    Smoothing(SmoothingError),
    Data(DataError),
    Numerics(NumericsError),
}

impl OptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptError::InvalidDtMax { .. }
            | OptError::InvalidMaxIter { .. }
            | OptError::TooFewCycleTimes { .. }
            | OptError::InvalidCycleTime { .. }
            | OptError::NoChannels => ErrorKind::Configuration,
            OptError::NonFiniteCost { .. } => ErrorKind::Numerical,
            OptError::MissingBestParam | OptError::NotInitialized { .. } => ErrorKind::State,
            OptError::InvalidParameter { .. } => ErrorKind::Configuration,
            OptError::NotImplemented { .. }
            | OptError::ConditionViolated { .. }
            | OptError::CheckPointNotFound { .. }
            | OptError::PotentialBug { .. }
            | OptError::ImpossibleError { .. }
            | OptError::BackendError { .. }
            | OptError::UnknownError => ErrorKind::Backend,
            OptError::Smoothing(err) => err.kind(),
            OptError::Data(err) => err.kind(),
            OptError::Numerics(err) => err.kind(),
        }
    }
}

impl std::error::Error for OptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OptError::Smoothing(err) => Some(err),
            OptError::Data(err) => Some(err),
            OptError::Numerics(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- CycleTimeOptions ----
            OptError::InvalidDtMax { value, reason } => {
                write!(f, "Invalid maximum time change {value}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }

            // ---- Cycle times ----
            OptError::TooFewCycleTimes { count } => {
                write!(f, "At least two cycle times are required, got {count}")
            }
            OptError::InvalidCycleTime { index, value } => {
                write!(f, "Invalid initial cycle time at index {index}: {value}, must be finite")
            }
            OptError::NoChannels => write!(f, "No channels selected for cycle-time optimization"),

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Objective returned a non-finite error: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::MissingBestParam => {
                write!(f, "Optimizer finished without a best set of cycle times")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => write!(f, "Invalid parameter: {text}"),
            OptError::NotImplemented { text } => write!(f, "Not implemented: {text}"),
            OptError::NotInitialized { text } => write!(f, "Not initialized: {text}"),
            OptError::ConditionViolated { text } => write!(f, "Condition violated: {text}"),
            OptError::CheckPointNotFound { text } => write!(f, "Checkpoint not found: {text}"),
            OptError::PotentialBug { text } => write!(f, "Potential bug: {text}"),
            OptError::ImpossibleError { text } => write!(f, "Impossible error: {text}"),
            OptError::BackendError { text } => write!(f, "Backend error: {text}"),
            OptError::UnknownError => write!(f, "Unknown optimizer backend error"),

            // ---- Wrapped ----
            OptError::Smoothing(err) => write!(f, "{err}"),
            OptError::Data(err) => write!(f, "{err}"),
            OptError::Numerics(err) => write!(f, "{err}"),
        }
    }
}

/// Recover crate errors raised inside the objective, then argmin's own.
impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<SmoothingError> for OptError {
    fn from(err: SmoothingError) -> Self {
        OptError::Smoothing(err)
    }
}

impl From<DataError> for OptError {
    fn from(err: DataError) -> Self {
        OptError::Data(err)
    }
}

impl From<NumericsError> for OptError {
    fn from(err: NumericsError) -> Self {
        OptError::Numerics(err)
    }
}

/// Convert an [`OptError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
