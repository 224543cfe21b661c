//! Small polynomial and grid helpers shared by the fitting modules.
use ndarray::{Array1, Array2, ArrayView1};

use crate::numerics::{
    errors::{NumResult, NumericsError},
    lstsq::lstsq,
};

/// `n` evenly spaced values from `start` to `end` inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty array.
pub fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => Array1::linspace(start, end, n),
    }
}

/// Macaulay bracket ⟨x⟩ = max(x, 0).
#[inline]
pub fn macaulay(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

/// Least-squares polynomial fit.
///
/// Parameters
/// ----------
/// - `x`, `y`: samples of equal length.
/// - `degree`: polynomial degree.
///
/// Returns
/// -------
/// Coefficients in **ascending** power order, `c[0] + c[1] x + … + c[d] x^d`,
/// together with the rank of the Vandermonde matrix.
///
/// Errors
/// ------
/// - `NumericsError::LengthMismatch` if `x` and `y` differ in length.
/// - `NumericsError::EmptySystem` if there are no samples.
pub fn polyfit(
    x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>, degree: usize,
) -> NumResult<(Array1<f64>, usize)> {
    if x.len() != y.len() {
        return Err(NumericsError::LengthMismatch { x_len: x.len(), y_len: y.len() });
    }
    let vander = Array2::from_shape_fn((x.len(), degree + 1), |(i, j)| x[i].powi(j as i32));
    let sol = lstsq(&vander, y)?;
    Ok((sol.coefficients, sol.rank))
}

/// Evaluate ascending-order coefficients at `x` (Horner).
pub fn polyval(coefficients: ArrayView1<'_, f64>, x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `linspace` must include both endpoints and handle degenerate counts.
    fn linspace_includes_endpoints() {
        let grid = linspace(0.0, 1.0, 5);
        assert_eq!(grid, array![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), array![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A quadratic is recovered exactly by a degree-2 fit and evaluated back.
    fn polyfit_and_polyval_recover_quadratic() {
        // Arrange
        let x = array![-1.0, 0.0, 1.0, 2.0, 3.0];
        let y = x.mapv(|v| 1.0 - 2.0 * v + 0.5 * v * v);

        // Act
        let (c, rank) = polyfit(x.view(), y.view(), 2).unwrap();

        // Assert
        assert_eq!(rank, 3);
        assert_relative_eq!(c[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(c[1], -2.0, epsilon = 1e-10);
        assert_relative_eq!(c[2], 0.5, epsilon = 1e-10);
        assert_relative_eq!(polyval(c.view(), 4.0), 1.0 - 8.0 + 8.0, epsilon = 1e-9);
    }

    #[test]
    fn macaulay_clips_negative_values() {
        assert_eq!(macaulay(-0.5), 0.0);
        assert_eq!(macaulay(0.0), 0.0);
        assert_eq!(macaulay(1.5), 1.5);
    }
}
