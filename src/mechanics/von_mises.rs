//! von_mises — effective stress/strain and stress-plane angles for
//! axial-torsional loading.
//!
//! Purpose
//! -------
//! Collapse the axial and shear components of a thin-walled tube test into
//! von Mises invariants and describe the loading direction in the
//! `σ`–`√3 τ` plane, where equal effective stress traces a circle.
//!
//! Key behaviors
//! -------------
//! - `effective_stress = sqrt(σ² + 3 τ²)`, `effective_strain = sqrt(ε² + γ²/3)`
//!   in scalar and array form.
//! - [`polar_angle`] measures the angle from the `σ` axis relative to the
//!   mean point of the input, which keeps the angle continuous around ±π.
//! - [`stress_polar`] returns radius and angle together.
//!
//! Invariants & assumptions
//! ------------------------
//! - Angles lie in `[mid − π, mid + π]` with `mid` the angle of the mean
//!   point. Data that rotates through a full turn cannot be represented
//!   continuously; such paths are outside the supported range.
use ndarray::{Array1, ArrayView1, Zip};

use crate::mechanics::errors::{MechanicsError, MechanicsResult};

/// `sqrt(σ² + 3 τ²)`.
#[inline]
pub fn effective_stress(sig: f64, tau: f64) -> f64 {
    (sig * sig + 3.0 * tau * tau).sqrt()
}

/// `sqrt(ε² + γ² / 3)` with `γ` the engineering shear strain.
#[inline]
pub fn effective_strain(eps: f64, gam: f64) -> f64 {
    (eps * eps + gam * gam / 3.0).sqrt()
}

/// Element-wise [`effective_stress`].
///
/// Errors
/// ------
/// - `MechanicsError::LengthMismatch` if `sig` and `tau` differ in length.
pub fn effective_stress_array(
    sig: ArrayView1<'_, f64>, tau: ArrayView1<'_, f64>,
) -> MechanicsResult<Array1<f64>> {
    check_pair(sig, tau)?;
    Ok(Zip::from(&sig).and(&tau).map_collect(|&s, &t| effective_stress(s, t)))
}

/// Element-wise [`effective_strain`].
///
/// Errors
/// ------
/// - `MechanicsError::LengthMismatch` if `eps` and `gam` differ in length.
pub fn effective_strain_array(
    eps: ArrayView1<'_, f64>, gam: ArrayView1<'_, f64>,
) -> MechanicsResult<Array1<f64>> {
    check_pair(eps, gam)?;
    Ok(Zip::from(&eps).and(&gam).map_collect(|&e, &g| effective_strain(e, g)))
}

/// Angle of every point `(σ, √3 τ)` measured from the `σ` axis.
///
/// The points are rotated by the angle of their mean point, measured with
/// `atan2` in that frame and rotated back, so paths that straddle the
/// negative `σ` axis do not jump by 2π. An empty input gives an empty
/// output.
///
/// Errors
/// ------
/// - `MechanicsError::LengthMismatch` if `sig` and `tau` differ in length.
pub fn polar_angle(
    sig: ArrayView1<'_, f64>, tau: ArrayView1<'_, f64>,
) -> MechanicsResult<Array1<f64>> {
    check_pair(sig, tau)?;
    if sig.is_empty() {
        return Ok(Array1::zeros(0));
    }
    let root3 = 3f64.sqrt();
    let n = sig.len() as f64;
    let x_mean = sig.sum() / n;
    let y_mean = tau.iter().map(|t| root3 * t).sum::<f64>() / n;
    let mid = y_mean.atan2(x_mean);
    let (sin_m, cos_m) = mid.sin_cos();

    Ok(Zip::from(&sig).and(&tau).map_collect(|&s, &t| {
        let y = root3 * t;
        let xr = s * cos_m + y * sin_m;
        let yr = -s * sin_m + y * cos_m;
        yr.atan2(xr) + mid
    }))
}

/// Radius ([`effective_stress`]) and [`polar_angle`] of every point.
pub fn stress_polar(
    sig: ArrayView1<'_, f64>, tau: ArrayView1<'_, f64>,
) -> MechanicsResult<(Array1<f64>, Array1<f64>)> {
    Ok((effective_stress_array(sig, tau)?, polar_angle(sig, tau)?))
}

fn check_pair(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> MechanicsResult<()> {
    if a.len() != b.len() {
        return Err(MechanicsError::LengthMismatch { left: a.len(), right: b.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::f64::consts::PI;

    #[test]
    fn effective_values_of_pure_components() {
        for v in [0.3, 1.7, -2.5] {
            assert_abs_diff_eq!(effective_stress(v, 0.0), v.abs());
            assert_abs_diff_eq!(effective_stress(0.0, v), v.abs() * 3f64.sqrt(), epsilon = 1e-12);
            assert_abs_diff_eq!(effective_strain(v, 0.0), v.abs());
            assert_abs_diff_eq!(effective_strain(0.0, v), v.abs() / 3f64.sqrt(), epsilon = 1e-12);
        }
        let s = array![0.5, 1.0];
        let vm = effective_stress_array(s.view(), s.view()).unwrap();
        assert_abs_diff_eq!(vm[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Single points land on the expected axes.
    fn angle_of_axis_points() {
        let angle = |s: f64, t: f64| polar_angle(array![s].view(), array![t].view()).unwrap()[0];

        assert_abs_diff_eq!(angle(1.3, 0.0).cos(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angle(0.0, 1.3).sin(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angle(-1.3, 0.0), PI, epsilon = 1e-12);
        assert_abs_diff_eq!(angle(0.0, -1.3).sin(), -1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Points on both sides of the negative σ axis keep a continuous angle.
    //
    // Given
    // -----
    // - σ = [0, −1], τ = [1, −1] / √3, i.e. points (0, 1) and (−1, −1).
    //
    // Expect
    // ------
    // - Angles [π/2, 5π/4] (not −3π/4 for the second point).
    fn angle_is_continuous_around_pi() {
        let sig = array![0.0, -1.0];
        let tau = array![1.0, -1.0] / 3f64.sqrt();

        let angle = polar_angle(sig.view(), tau.view()).unwrap();

        assert_abs_diff_eq!(angle[0], PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(angle[1], 1.25 * PI, epsilon = 1e-12);
    }

    #[test]
    fn stress_polar_combines_radius_and_angle() {
        let sig = array![0.2, 0.9, 0.4];
        let tau = array![0.7, 0.1, 0.3];

        let (radius, angle) = stress_polar(sig.view(), tau.view()).unwrap();

        for i in 0..3 {
            assert_abs_diff_eq!(radius[i], effective_stress(sig[i], tau[i]), epsilon = 1e-12);
            let direct = (3f64.sqrt() * tau[i]).atan2(sig[i]);
            assert_abs_diff_eq!(angle[i], direct, epsilon = 1e-9);
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = polar_angle(array![1.0].view(), array![1.0, 2.0].view()).unwrap_err();
        assert_eq!(err, MechanicsError::LengthMismatch { left: 1, right: 2 });
    }
}
