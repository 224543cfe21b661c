use crate::error_kind::ErrorKind;

/// Result alias for linear-algebra helpers.
pub type NumResult<T> = Result<T, NumericsError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NumericsError {
    // ---- Shapes ----
    /// Least-squares system without rows or columns.
    EmptySystem { rows: usize, cols: usize },

    /// Right-hand side length differs from the number of matrix rows.
    RhsLengthMismatch { expected: usize, found: usize },

    /// Abscissa and ordinate lengths differ.
    LengthMismatch { x_len: usize, y_len: usize },

    // ---- Backend ----
    /// The SVD iteration did not converge.
    SvdNotConverged,

    /// nalgebra refused to solve with the computed decomposition.
    Decomposition { reason: &'static str },

    /// A linear-algebra input contained NaN or ±∞.
    NonFiniteInput { row: usize, col: usize, value: f64 },
}

impl NumericsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NumericsError::EmptySystem { .. }
            | NumericsError::RhsLengthMismatch { .. }
            | NumericsError::LengthMismatch { .. } => ErrorKind::Configuration,
            NumericsError::NonFiniteInput { .. } => ErrorKind::Data,
            NumericsError::SvdNotConverged | NumericsError::Decomposition { .. } => {
                ErrorKind::Numerical
            }
        }
    }
}

impl std::error::Error for NumericsError {}

impl std::fmt::Display for NumericsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            NumericsError::EmptySystem { rows, cols } => {
                write!(f, "Empty least-squares system: {rows} rows, {cols} columns")
            }
            NumericsError::RhsLengthMismatch { expected, found } => {
                write!(f, "Right-hand side length mismatch: expected {expected}, found {found}")
            }
            NumericsError::LengthMismatch { x_len, y_len } => {
                write!(f, "Abscissa/ordinate length mismatch: {x_len} vs {y_len}")
            }

            // ---- Backend ----
            NumericsError::SvdNotConverged => {
                write!(f, "Singular value decomposition did not converge")
            }
            NumericsError::Decomposition { reason } => {
                write!(f, "Least-squares solve failed: {reason}")
            }
            NumericsError::NonFiniteInput { row, col, value } => {
                write!(f, "Non-finite matrix entry at ({row}, {col}): {value}")
            }
        }
    }
}
