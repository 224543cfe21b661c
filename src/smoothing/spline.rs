//! spline — truncated-power-basis regression spline.
//!
//! Purpose
//! -------
//! Provide the shared basis-matrix abstraction behind every local filter. A
//! [`SplineModel`] of degree `d` with knots `k_1..k_m` spans
//!
//! ```text
//! 1, x, x², …, x^d, ⟨x − k_1⟩^d, …, ⟨x − k_m⟩^d
//! ```
//!
//! where `⟨x − k⟩^d` is `(x − k)^d` for `x > k` and 0 otherwise. With no
//! knots it is an ordinary least-squares polynomial.
//!
//! Key behaviors
//! -------------
//! - [`SplineModel::fit`] solves the least-squares problem (minimum-norm when
//!   the basis is rank deficient, e.g. a knot at the first sample) and marks
//!   the model fitted.
//! - [`SplineModel::eval`] evaluates at arbitrary abscissae and fails with
//!   `SmoothingError::ModelNotFitted` before a successful fit.
//!
//! Invariants & assumptions
//! ------------------------
//! - The coefficient vector always has `degree + 1 + num_knots` entries.
//! - The abscissa is mapped to `u = (x − origin) / scale` with origin and
//!   scale taken from the fitted samples (their minimum and range). This
//!   leaves the function space unchanged and keeps powers of large time
//!   stamps well conditioned. Coefficients refer to `u`.
//!
//! Testing notes
//! -------------
//! - Unit tests cover exact reproduction of polynomials up to the spline
//!   degree, the state error before fitting, and prediction outside the
//!   fitted samples.
use ndarray::{Array1, Array2, ArrayView1};

use crate::{
    numerics::lstsq::lstsq,
    smoothing::errors::{SmoothingError, SmoothingResult},
};

/// Regression spline in the truncated power basis.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineModel {
    degree: usize,
    knots: Array1<f64>,
    coefficients: Array1<f64>,
    origin: f64,
    scale: f64,
    fitted: bool,
}

impl SplineModel {
    /// Unfitted spline of `degree` with the given knots.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::InvalidKnotPosition` if a knot is NaN or ±∞.
    pub fn new(degree: usize, knots: Array1<f64>) -> SmoothingResult<Self> {
        if let Some((index, &value)) = knots.iter().enumerate().find(|(_, k)| !k.is_finite()) {
            return Err(SmoothingError::InvalidKnotPosition { index, value });
        }
        let coefficients = Array1::zeros(degree + 1 + knots.len());
        Ok(SplineModel { degree, knots, coefficients, origin: 0.0, scale: 1.0, fitted: false })
    }

    /// Knot-free spline, i.e. a polynomial of `degree`.
    pub fn polynomial(degree: usize) -> Self {
        SplineModel {
            degree,
            knots: Array1::zeros(0),
            coefficients: Array1::zeros(degree + 1),
            origin: 0.0,
            scale: 1.0,
            fitted: false,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &Array1<f64> {
        &self.knots
    }

    /// Basis coefficients in normalized abscissa (zeros until fitted).
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fit the spline to `(x, y)` by least squares.
    ///
    /// Parameters
    /// ----------
    /// - `x`: abscissae (any order, at least one sample).
    /// - `y`: ordinates, same length as `x`.
    ///
    /// Returns
    /// -------
    /// `SmoothingResult<usize>` with the numerical rank of the basis matrix.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::LengthMismatch` if `x` and `y` differ in length.
    /// - `SmoothingError::Numerics` for an empty or non-finite system.
    ///
    /// Notes
    /// -----
    /// - On error the model keeps its previous state.
    pub fn fit(&mut self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> SmoothingResult<usize> {
        if x.len() != y.len() {
            return Err(SmoothingError::LengthMismatch { t_len: x.len(), v_len: y.len() });
        }
        let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;
        let (origin, scale) = if span.is_finite() && span > 0.0 { (lo, span) } else { (lo, 1.0) };

        let basis = self.basis_matrix_with(x, origin, scale);
        let sol = lstsq(&basis, y)?;

        self.origin = origin;
        self.scale = scale;
        self.coefficients = sol.coefficients;
        self.fitted = true;
        Ok(sol.rank)
    }

    /// Evaluate the fitted spline.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::ModelNotFitted` before a successful [`fit`](Self::fit).
    pub fn eval(&self, x: ArrayView1<'_, f64>) -> SmoothingResult<Array1<f64>> {
        if !self.fitted {
            return Err(SmoothingError::ModelNotFitted);
        }
        Ok(self.basis_matrix_with(x, self.origin, self.scale).dot(&self.coefficients))
    }

    fn basis_matrix_with(&self, x: ArrayView1<'_, f64>, origin: f64, scale: f64) -> Array2<f64> {
        let d = self.degree as i32;
        let scaled_knots: Vec<f64> = self.knots.iter().map(|k| (k - origin) / scale).collect();
        let mut basis = Array2::zeros((x.len(), self.coefficients.len()));
        for (mut row, &xi) in basis.rows_mut().into_iter().zip(x.iter()) {
            let u = (xi - origin) / scale;
            for j in 0..=self.degree {
                row[j] = u.powi(j as i32);
            }
            for (m, &ku) in scaled_knots.iter().enumerate() {
                if u > ku {
                    row[self.degree + 1 + m] = (u - ku).powi(d);
                }
            }
        }
        basis
    }
}
