//! filters — local smoothing strategies applied to one segment at a time.
//!
//! Purpose
//! -------
//! Enumerate the fitting strategies the local smoother can apply to a slice
//! `(t, v)` of one channel. Every strategy returns fitted values at the
//! sample times, or at separate prediction times via [`LocalFilter::predict`].
//!
//! Key behaviors
//! -------------
//! - `Polynomial { degree }`: ordinary least-squares polynomial.
//! - `LinearSegments { segments }`: degree-1 spline (continuous piecewise
//!   linear) with uniformly spaced knots.
//! - `CubicSpline { knots }`: degree-3 spline with uniformly spaced knots.
//! - `Spline { degree, knots }`: general truncated-power spline.
//! - `Custom(f)`: caller-supplied function pointer.
//!
//! Conventions
//! -----------
//! - Knot counts are given either directly or as a fraction of the number
//!   of samples ([`KnotCount`]); knots are spread uniformly from the first
//!   to the last sample time, both included.
use ndarray::{Array1, ArrayView1};

use crate::{
    numerics::polynomial::linspace,
    smoothing::{
        errors::{SmoothingError, SmoothingResult},
        spline::SplineModel,
    },
};

/// Default share of samples used as knots / segments.
pub const DEFAULT_KNOT_FRACTION: f64 = 0.25;

/// Signature of a custom local filter: `(t, v, t_pred) -> fitted at t_pred`.
pub type FilterFn = for<'t, 'v, 'p> fn(
    ArrayView1<'t, f64>,
    ArrayView1<'v, f64>,
    ArrayView1<'p, f64>,
) -> Array1<f64>;

/// Number of knots (or linear segments) for a slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnotCount {
    /// Exactly this many knots.
    Count(usize),
    /// `floor(samples * fraction)` knots, `fraction` in `(0, 1]`.
    Fraction(f64),
}

impl Default for KnotCount {
    fn default() -> Self {
        KnotCount::Fraction(DEFAULT_KNOT_FRACTION)
    }
}

impl KnotCount {
    /// Resolve to a concrete count for a slice of `samples` points.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::InvalidKnotFraction` for a fraction outside `(0, 1]`.
    pub fn resolve(&self, samples: usize) -> SmoothingResult<usize> {
        match *self {
            KnotCount::Count(n) => Ok(n),
            KnotCount::Fraction(f) if f.is_finite() && f > 0.0 && f <= 1.0 => {
                Ok((samples as f64 * f).floor() as usize)
            }
            KnotCount::Fraction(f) => Err(SmoothingError::InvalidKnotFraction { value: f }),
        }
    }
}

/// `n` knots spread uniformly over `[t_first, t_last]`.
pub fn uniform_knots(t: ArrayView1<'_, f64>, n: usize) -> Array1<f64> {
    match (t.first(), t.last()) {
        (Some(&first), Some(&last)) => linspace(first, last, n),
        _ => Array1::zeros(0),
    }
}

/// Local smoothing strategy for one channel.
#[derive(Clone, Copy)]
pub enum LocalFilter {
    Polynomial { degree: usize },
    LinearSegments { segments: KnotCount },
    CubicSpline { knots: KnotCount },
    Spline { degree: usize, knots: KnotCount },
    Custom(FilterFn),
}

impl std::fmt::Debug for LocalFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalFilter::Polynomial { degree } => {
                f.debug_struct("Polynomial").field("degree", degree).finish()
            }
            LocalFilter::LinearSegments { segments } => {
                f.debug_struct("LinearSegments").field("segments", segments).finish()
            }
            LocalFilter::CubicSpline { knots } => {
                f.debug_struct("CubicSpline").field("knots", knots).finish()
            }
            LocalFilter::Spline { degree, knots } => {
                f.debug_struct("Spline").field("degree", degree).field("knots", knots).finish()
            }
            LocalFilter::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl LocalFilter {
    /// Least-squares polynomial of `degree`.
    pub fn polynomial(degree: usize) -> Self {
        LocalFilter::Polynomial { degree }
    }

    pub fn linear_segments(segments: KnotCount) -> Self {
        LocalFilter::LinearSegments { segments }
    }

    pub fn cubic_spline(knots: KnotCount) -> Self {
        LocalFilter::CubicSpline { knots }
    }

    /// Fitted values at the sample times.
    pub fn apply(&self, t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> SmoothingResult<Array1<f64>> {
        self.predict(t, v, t)
    }

    /// Fit `(t, v)` and evaluate at `t_pred`.
    ///
    /// Parameters
    /// ----------
    /// - `t`: sample times of the slice.
    /// - `v`: channel values of the slice, same length as `t`.
    /// - `t_pred`: evaluation times.
    ///
    /// Returns
    /// -------
    /// `SmoothingResult<Array1<f64>>` with `t_pred.len()` values.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::LengthMismatch` if `t` and `v` differ, or a custom
    ///   filter returns the wrong number of values.
    /// - `SmoothingError::TooFewSamples` for `LinearSegments` when
    ///   `t.len() <= segments`.
    /// - `SmoothingError::InvalidKnotFraction` for an invalid fraction.
    /// - `SmoothingError::Numerics` if the least-squares solve fails.
    pub fn predict(
        &self, t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>, t_pred: ArrayView1<'_, f64>,
    ) -> SmoothingResult<Array1<f64>> {
        if t.len() != v.len() {
            return Err(SmoothingError::LengthMismatch { t_len: t.len(), v_len: v.len() });
        }
        match *self {
            LocalFilter::Polynomial { degree } => fit_predict(SplineModel::polynomial(degree), t, v, t_pred),
            LocalFilter::LinearSegments { segments } => {
                let n = segments.resolve(t.len())?;
                if t.len() <= n {
                    return Err(SmoothingError::TooFewSamples { samples: t.len(), segments: n });
                }
                spline_predict(1, n, t, v, t_pred)
            }
            LocalFilter::CubicSpline { knots } => spline_predict(3, knots.resolve(t.len())?, t, v, t_pred),
            LocalFilter::Spline { degree, knots } => {
                spline_predict(degree, knots.resolve(t.len())?, t, v, t_pred)
            }
            LocalFilter::Custom(f) => {
                let out = f(t, v, t_pred);
                if out.len() != t_pred.len() {
                    return Err(SmoothingError::LengthMismatch { t_len: t_pred.len(), v_len: out.len() });
                }
                Ok(out)
            }
        }
    }
}

fn spline_predict(
    degree: usize, num_knots: usize, t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>,
    t_pred: ArrayView1<'_, f64>,
) -> SmoothingResult<Array1<f64>> {
    let model = SplineModel::new(degree, uniform_knots(t, num_knots))?;
    fit_predict(model, t, v, t_pred)
}

fn fit_predict(
    mut model: SplineModel, t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>,
    t_pred: ArrayView1<'_, f64>,
) -> SmoothingResult<Array1<f64>> {
    model.fit(t, v)?;
    model.eval(t_pred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exactness of each filter on polynomials it can represent.
    // - Knot-count resolution and the linear-segment sample check.
    // - Custom filters and prediction at separate times.
    // -------------------------------------------------------------------------

    fn assert_close(a: &Array1<f64>, b: &Array1<f64>, tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = tol);
        }
    }

    #[test]
    // Purpose
    // -------
    // Linear data passes through every built-in filter unchanged.
    //
    // Given
    // -----
    // - v = 3 + 2t on 100 samples in [0, 10].
    //
    // Expect
    // ------
    // - Cubic polynomial, 25 linear segments and a cubic spline with default
    //   knots all return v.
    fn linear_input_is_unchanged_by_all_filters() {
        // Arrange
        let t = Array1::linspace(0.0, 10.0, 100);
        let v = t.mapv(|x| 3.0 + 2.0 * x);

        // Act / Assert
        for filter in [
            LocalFilter::polynomial(3),
            LocalFilter::linear_segments(KnotCount::default()),
            LocalFilter::cubic_spline(KnotCount::default()),
        ] {
            let out = filter.apply(t.view(), v.view()).unwrap();
            assert_close(&out, &v, 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // Quadratic data is reproduced by a quadratic polynomial and by a cubic
    // spline; cubic data by a cubic spline with three knots.
    fn polynomial_data_is_reproduced_exactly() {
        let t = Array1::linspace(0.0, 10.0, 100);
        let quad = t.mapv(|x| 1.0 - 0.5 * x + 0.3 * x * x);
        let cube = t.mapv(|x| 2.0 + x - 0.4 * x * x + 0.05 * x * x * x);

        let q_poly = LocalFilter::polynomial(2).apply(t.view(), quad.view()).unwrap();
        let q_spline = LocalFilter::cubic_spline(KnotCount::default()).apply(t.view(), quad.view()).unwrap();
        let c_spline = LocalFilter::cubic_spline(KnotCount::Count(3)).apply(t.view(), cube.view()).unwrap();

        assert_close(&q_poly, &quad, 1e-8);
        assert_close(&q_spline, &quad, 1e-8);
        assert_close(&c_spline, &cube, 1e-7);
    }

    #[test]
    // Purpose
    // -------
    // Asking for at least as many linear segments as samples is rejected.
    fn linear_segments_require_more_samples_than_segments() {
        let t = array![0.0, 1.0, 2.0];
        let v = array![0.0, 1.0, 0.0];

        let err = LocalFilter::linear_segments(KnotCount::Count(3)).apply(t.view(), v.view()).unwrap_err();

        assert_eq!(err, SmoothingError::TooFewSamples { samples: 3, segments: 3 });
    }

    #[test]
    fn knot_count_resolution() {
        assert_eq!(KnotCount::Fraction(0.25).resolve(100).unwrap(), 25);
        assert_eq!(KnotCount::Fraction(0.25).resolve(7).unwrap(), 1);
        assert_eq!(KnotCount::Count(4).resolve(2).unwrap(), 4);
        assert!(KnotCount::Fraction(0.0).resolve(10).is_err());
        assert!(KnotCount::Fraction(1.5).resolve(10).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Prediction evaluates the fit away from the sample times.
    fn predict_at_separate_times() {
        let t = Array1::linspace(0.0, 1.0, 11);
        let v = t.mapv(|x| 4.0 * x - 1.0);

        let out = LocalFilter::polynomial(1).predict(t.view(), v.view(), array![2.0, 3.0].view()).unwrap();

        assert_close(&out, &array![7.0, 11.0], 1e-10);
    }

    fn identity(
        _t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>, _t_pred: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        v.to_owned()
    }

    #[test]
    // Purpose
    // -------
    // Custom filters are called as-is and checked for output length.
    fn custom_filter_is_called() {
        let t = array![0.0, 1.0, 2.0];
        let v = array![5.0, -1.0, 2.0];

        let out = LocalFilter::Custom(identity).apply(t.view(), v.view()).unwrap();
        let err = LocalFilter::Custom(identity)
            .predict(t.view(), v.view(), array![0.5].view())
            .unwrap_err();

        assert_eq!(out, v);
        assert!(matches!(err, SmoothingError::LengthMismatch { .. }));
        assert_eq!(format!("{:?}", LocalFilter::Custom(identity)), "Custom(<fn>)");
    }

    /// Value of the last sample at or before each prediction time.
    fn hold_last(
        t: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>, t_pred: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        t_pred.mapv(|tp| {
            let i = t.iter().take_while(|&&ti| ti <= tp).count().saturating_sub(1);
            v[i]
        })
    }

    #[test]
    // Purpose
    // -------
    // A custom filter receives sample and prediction views that borrow from
    // unrelated arrays with independent lifetimes.
    //
    // Given
    // -----
    // - Samples sliced out of a longer buffer, prediction times built in an
    //   inner scope.
    //
    // Expect
    // ------
    // - Zero-order hold values at the prediction times.
    fn custom_filter_predicts_with_independent_views() {
        // Arrange
        let buffer = array![0.0, 1.0, 2.0, 3.0, 10.0, 20.0, 30.0, 40.0];
        let t = buffer.slice(s![0..4]);
        let v = buffer.slice(s![4..8]);

        // Act
        let out = {
            let t_pred = array![0.5, 2.0, 7.0];
            LocalFilter::Custom(hold_last).predict(t, v, t_pred.view()).unwrap()
        };

        // Assert
        assert_eq!(out, array![10.0, 30.0, 40.0]);
    }
}
