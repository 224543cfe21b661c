//! lstsq — SVD-backed linear least squares with rank reporting.
//!
//! Purpose
//! -------
//! Solve overdetermined, square, or underdetermined systems `A x ≈ b` and
//! return the minimum-norm solution together with the numerical rank of `A`.
//! Every fitting routine in the crate (local splines, the global piecewise
//! basis, compliance identification, quadratic step models) goes through
//! this module.
//!
//! Key behaviors
//! -------------
//! - Copy the `ndarray` design matrix into an `nalgebra::DMatrix` and compute
//!   a thin SVD once ([`LeastSquares::new`]).
//! - Reuse the decomposition for any number of right-hand sides
//!   ([`LeastSquares::solve`]); the global smoother solves one system per
//!   channel against the same basis.
//! - Singular values below `ε · max(m, n) · σ_max` are treated as zero, both
//!   for the rank and for the pseudo-inverse.
//!
//! Invariants & assumptions
//! ------------------------
//! - `A` has at least one row and one column and contains only finite values.
//! - Rank deficiency is not an error: the minimum-norm solution is returned and
//!   callers decide whether to emit a diagnostic.
//!
//! Testing notes
//! -------------
//! - Unit tests cover exact recovery for a full-rank system, the
//!   minimum-norm choice for duplicated columns, rank reporting, and shape
//!   validation.
use nalgebra::{DMatrix, DVector, Dyn, SVD};
use ndarray::{Array1, Array2, ArrayView1};

use crate::numerics::errors::{NumResult, NumericsError};

/// Reusable least-squares solver for a fixed design matrix.
///
/// Fields
/// ------
/// - `svd`: thin SVD of the design matrix (U and Vᵀ computed).
/// - `cutoff`: singular values `<= cutoff` are treated as zero.
/// - `nrows`, `ncols`: shape of the design matrix.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    svd: SVD<f64, Dyn, Dyn>,
    cutoff: f64,
    nrows: usize,
    ncols: usize,
}

impl LeastSquares {
    /// Decompose a design matrix for later solves.
    ///
    /// Parameters
    /// ----------
    /// - `a`: `&Array2<f64>`
    ///   Design matrix with `m >= 1` rows and `n >= 1` columns.
    ///
    /// Returns
    /// -------
    /// `NumResult<LeastSquares>`
    ///   Solver holding the SVD and its rank cutoff.
    ///
    /// Errors
    /// ------
    /// - `NumericsError::EmptySystem` if `m == 0` or `n == 0`.
    /// - `NumericsError::NonFiniteInput` for the first NaN/±∞ entry.
    /// - `NumericsError::SvdNotConverged` if the iterative SVD fails.
    pub fn new(a: &Array2<f64>) -> NumResult<Self> {
        let (nrows, ncols) = a.dim();
        if nrows == 0 || ncols == 0 {
            return Err(NumericsError::EmptySystem { rows: nrows, cols: ncols });
        }
        if let Some(((row, col), &value)) = a.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(NumericsError::NonFiniteInput { row, col, value });
        }

        let mut design = DMatrix::<f64>::zeros(nrows, ncols);
        fill_dmatrix(a, &mut design);

        let svd = SVD::try_new(design, true, true, f64::EPSILON, 0)
            .ok_or(NumericsError::SvdNotConverged)?;
        let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
        let cutoff = f64::EPSILON * nrows.max(ncols) as f64 * sigma_max;

        Ok(LeastSquares { svd, cutoff, nrows, ncols })
    }

    /// Numerical rank of the design matrix.
    pub fn rank(&self) -> usize {
        self.svd.rank(self.cutoff)
    }

    /// Number of unknowns (columns of the design matrix).
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of equations (rows of the design matrix).
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Minimum-norm least-squares solution for one right-hand side.
    ///
    /// Errors
    /// ------
    /// - `NumericsError::RhsLengthMismatch` if `b.len() != nrows`.
    /// - `NumericsError::Decomposition` if nalgebra rejects the solve.
    pub fn solve(&self, b: ArrayView1<'_, f64>) -> NumResult<Array1<f64>> {
        if b.len() != self.nrows {
            return Err(NumericsError::RhsLengthMismatch { expected: self.nrows, found: b.len() });
        }
        let rhs = DVector::from_iterator(b.len(), b.iter().copied());
        let x = self
            .svd
            .solve(&rhs, self.cutoff)
            .map_err(|reason| NumericsError::Decomposition { reason })?;
        Ok(x.iter().copied().collect())
    }
}

/// Result of a one-shot least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LstsqSolution {
    /// Minimum-norm coefficients.
    pub coefficients: Array1<f64>,
    /// Numerical rank of the design matrix.
    pub rank: usize,
}

/// Solve `A x ≈ b` once and report the rank of `A`.
pub fn lstsq(a: &Array2<f64>, b: ArrayView1<'_, f64>) -> NumResult<LstsqSolution> {
    let solver = LeastSquares::new(a)?;
    let coefficients = solver.solve(b)?;
    Ok(LstsqSolution { coefficients, rank: solver.rank() })
}

/// Copy a row-major `ndarray` matrix into a column-major `DMatrix`.
///
/// Walks column by column to match the `DMatrix` storage order.
fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    let (nrows, ncols) = src.dim();
    for j in 0..ncols {
        for i in 0..nrows {
            dst[(i, j)] = src[[i, j]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery for full-rank systems.
    // - Minimum-norm solutions and rank for rank-deficient systems.
    // - Shape validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A consistent overdetermined system must be solved exactly.
    //
    // Given
    // -----
    // - y = 2 + 3x sampled at four points, design [1, x].
    //
    // Expect
    // ------
    // - Coefficients (2, 3) and full rank 2.
    fn lstsq_recovers_line_exactly() {
        // Arrange
        let a = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let b = array![2.0, 5.0, 8.0, 11.0];

        // Act
        let sol = lstsq(&a, b.view()).unwrap();

        // Assert
        assert_eq!(sol.rank, 2);
        assert_relative_eq!(sol.coefficients[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(sol.coefficients[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Duplicate columns make the system rank deficient; the solver must split
    // the weight evenly (minimum norm) instead of failing.
    //
    // Given
    // -----
    // - A = [x, x] with b = 4x.
    //
    // Expect
    // ------
    // - Rank 1 and coefficients (2, 2).
    fn lstsq_returns_minimum_norm_for_duplicate_columns() {
        // Arrange
        let a = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let b = array![4.0, 8.0, 12.0];

        // Act
        let sol = lstsq(&a, b.view()).unwrap();

        // Assert
        assert_eq!(sol.rank, 1);
        assert_relative_eq!(sol.coefficients[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(sol.coefficients[1], 2.0, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // An all-zero column contributes nothing and gets a zero coefficient.
    fn lstsq_zero_column_gets_zero_coefficient() {
        let a = array![[1.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
        let b = array![3.0, 3.0, 3.0];

        let sol = lstsq(&a, b.view()).unwrap();

        assert_eq!(sol.rank, 1);
        assert_relative_eq!(sol.coefficients[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sol.coefficients[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Shape errors are reported rather than panicking.
    fn least_squares_rejects_empty_and_mismatched_inputs() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert_eq!(
            LeastSquares::new(&empty).unwrap_err(),
            NumericsError::EmptySystem { rows: 0, cols: 2 }
        );

        let a = array![[1.0], [2.0]];
        let solver = LeastSquares::new(&a).unwrap();
        let err = solver.solve(array![1.0, 2.0, 3.0].view()).unwrap_err();
        assert_eq!(err, NumericsError::RhsLengthMismatch { expected: 2, found: 3 });
    }

    #[test]
    // Purpose
    // -------
    // One decomposition must serve several right-hand sides.
    fn least_squares_reuses_decomposition_for_many_rhs() {
        let a = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0]];
        let solver = LeastSquares::new(&a).unwrap();

        let c1 = solver.solve(array![1.0, 1.0, 1.0].view()).unwrap();
        let c2 = solver.solve(array![0.0, 2.0, 4.0].view()).unwrap();

        assert_relative_eq!(c1[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(c1[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(c2[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(c2[1], 2.0, epsilon = 1e-12);
    }
}
