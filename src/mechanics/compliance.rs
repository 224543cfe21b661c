//! compliance — elastic compliance identification for axial-torsional data.
//!
//! Purpose
//! -------
//! Identify strain offsets and compliances so that
//! `[ε − ε₀, γ − γ₀]ᵀ ≈ C [σ, τ]ᵀ` over a window of samples. The moduli used
//! by the yield-point search are the reciprocals of the diagonal of `C`.
//!
//! Key behaviors
//! -------------
//! - With both components, one interleaved least-squares system is solved:
//!   even rows `[1, 0, σ, 0, (τ)] · c = ε`, odd rows
//!   `[0, 1, 0, τ, (σ)] · c = γ`. The bracketed column exists only for the
//!   anisotropic model and holds the cross compliance.
//! - With a single component, a degree-1 polynomial fit of that strain
//!   against its stress is used; the other compliance is zero and the other
//!   offset is the mean of the other strain.
//! - Rank deficiency (for example proportional loading) is reported through
//!   `tracing::warn!` and the minimum-norm solution is returned.
//!
//! Invariants & assumptions
//! ------------------------
//! - Windows are half-open `[start, end)` sample ranges of the series.
//! - The anisotropic model requires both components.
//!
//! Downstream usage
//! ----------------
//! - `yield_point` fits a [`ComplianceVector`] on the elastic part of every
//!   segment and subtracts [`ComplianceVector::elastic_strain`] from the
//!   measured strains.
use ndarray::{Array1, Array2, ArrayView1, s};
use tracing::warn;

use crate::{
    data::series::{EPS, GAM, SIG, TAU, TimeSeries},
    mechanics::errors::{MechanicsError, MechanicsResult},
    numerics::{lstsq::lstsq, polynomial::polyfit},
};

/// Which compliance components to identify.
///
/// Default: isotropic with both axial and shear components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplianceOptions {
    pub anisotropic: bool,
    pub axial: bool,
    pub shear: bool,
}

impl Default for ComplianceOptions {
    fn default() -> Self {
        ComplianceOptions { anisotropic: false, axial: true, shear: true }
    }
}

impl ComplianceOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - `MechanicsError::AnisotropicNeedsBoth` if `anisotropic` without both
    ///   components.
    /// - `MechanicsError::NoComponents` if neither component is requested.
    pub fn new(anisotropic: bool, axial: bool, shear: bool) -> MechanicsResult<Self> {
        let opts = ComplianceOptions { anisotropic, axial, shear };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> MechanicsResult<()> {
        if self.anisotropic && !(self.axial && self.shear) {
            return Err(MechanicsError::AnisotropicNeedsBoth);
        }
        if !(self.axial || self.shear) {
            return Err(MechanicsError::NoComponents);
        }
        Ok(())
    }
}

/// Identified offsets and compliances.
///
/// Fields
/// ------
/// - `axial_offset`, `shear_offset`: strains at zero stress (ε₀, γ₀).
/// - `axial`, `shear`: diagonal compliances (`1/E`, `1/G`); zero when the
///   component was not requested.
/// - `cross`: cross compliance of the anisotropic model, `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceVector {
    pub axial_offset: f64,
    pub shear_offset: f64,
    pub axial: f64,
    pub shear: f64,
    pub cross: Option<f64>,
}

impl ComplianceVector {
    /// Axial modulus `1 / axial` (infinite if `axial == 0`).
    pub fn axial_modulus(&self) -> f64 {
        1.0 / self.axial
    }

    /// Shear modulus `1 / shear` (infinite if `shear == 0`).
    pub fn shear_modulus(&self) -> f64 {
        1.0 / self.shear
    }

    /// `[ε₀, γ₀, Cσ, Cτ]`, followed by the cross compliance if present.
    pub fn to_array(&self) -> Array1<f64> {
        let mut values = vec![self.axial_offset, self.shear_offset, self.axial, self.shear];
        values.extend(self.cross);
        Array1::from(values)
    }

    /// Elastic strains over `[start, end)`.
    ///
    /// `ε_el = Cσ σ + Cστ τ` and `γ_el = Cτ τ + Cστ σ`. Offsets are not
    /// included, so differences of total minus elastic strain are plastic
    /// strain changes.
    ///
    /// Errors
    /// ------
    /// - `MechanicsError::EmptyWindow` / `MechanicsError::WindowOutOfRange`
    ///   for an invalid window.
    /// - `MechanicsError::Data` if `sig` or `tau` is missing.
    pub fn elastic_strain(
        &self, series: &TimeSeries, start: usize, end: usize,
    ) -> MechanicsResult<(Array1<f64>, Array1<f64>)> {
        check_window(series, start, end)?;
        let sig = series.channel(SIG)?.slice(s![start..end]);
        let tau = series.channel(TAU)?.slice(s![start..end]);
        let cross = self.cross.unwrap_or(0.0);
        let eps_el = &sig * self.axial + &tau * cross;
        let gam_el = &tau * self.shear + &sig * cross;
        Ok((eps_el, gam_el))
    }
}

/// Fit offsets and compliances on samples `[start, end)`.
///
/// Parameters
/// ----------
/// - `series`: `&TimeSeries` with `sig`, `eps`, `tau` and `gam`.
/// - `start`, `end`: half-open sample window.
/// - `opts`: `&ComplianceOptions`.
///
/// Returns
/// -------
/// `MechanicsResult<ComplianceVector>`
///
/// Errors
/// ------
/// - Configuration errors from [`ComplianceOptions::validate`].
/// - `MechanicsError::EmptyWindow` if `start >= end`.
/// - `MechanicsError::WindowOutOfRange` if `end > series.len()`.
/// - `MechanicsError::Data` for missing channels.
/// - `MechanicsError::Numerics` if the least-squares backend fails.
///
/// Notes
/// -----
/// - Insufficient rank is not an error. It is logged at `warn` level.
pub fn solve(
    series: &TimeSeries, start: usize, end: usize, opts: &ComplianceOptions,
) -> MechanicsResult<ComplianceVector> {
    opts.validate()?;
    check_window(series, start, end)?;
    let sig = series.channel(SIG)?.slice(s![start..end]);
    let eps = series.channel(EPS)?.slice(s![start..end]);
    let tau = series.channel(TAU)?.slice(s![start..end]);
    let gam = series.channel(GAM)?.slice(s![start..end]);

    match (opts.axial, opts.shear) {
        (true, true) => solve_coupled(sig, eps, tau, gam, opts.anisotropic),
        (true, false) => {
            let (offset, compliance) = fit_line(sig, eps, "axial")?;
            Ok(ComplianceVector {
                axial_offset: offset,
                shear_offset: mean(gam),
                axial: compliance,
                shear: 0.0,
                cross: None,
            })
        }
        (false, true) => {
            let (offset, compliance) = fit_line(tau, gam, "shear")?;
            Ok(ComplianceVector {
                axial_offset: mean(eps),
                shear_offset: offset,
                axial: 0.0,
                shear: compliance,
                cross: None,
            })
        }
        (false, false) => Err(MechanicsError::NoComponents),
    }
}

fn solve_coupled(
    sig: ArrayView1<'_, f64>, eps: ArrayView1<'_, f64>, tau: ArrayView1<'_, f64>,
    gam: ArrayView1<'_, f64>, anisotropic: bool,
) -> MechanicsResult<ComplianceVector> {
    let n = sig.len();
    let num_params = if anisotropic { 5 } else { 4 };
    let mut a = Array2::<f64>::zeros((2 * n, num_params));
    let mut b = Array1::<f64>::zeros(2 * n);
    for i in 0..n {
        let (row_e, row_g) = (2 * i, 2 * i + 1);
        a[[row_e, 0]] = 1.0;
        a[[row_e, 2]] = sig[i];
        a[[row_g, 1]] = 1.0;
        a[[row_g, 3]] = tau[i];
        if anisotropic {
            a[[row_e, 4]] = tau[i];
            a[[row_g, 4]] = sig[i];
        }
        b[row_e] = eps[i];
        b[row_g] = gam[i];
    }

    let sol = lstsq(&a, b.view())?;
    if anisotropic && sol.rank == 4 {
        warn!(
            rank = sol.rank,
            "insufficient rank for anisotropic compliance; stresses and strains may be \
             proportional with an isotropic response"
        );
    } else if sol.rank < 4 {
        warn!(
            rank = sol.rank,
            "insufficient rank for compliance identification; a stress component may be zero"
        );
    }

    let c = sol.coefficients;
    Ok(ComplianceVector {
        axial_offset: c[0],
        shear_offset: c[1],
        axial: c[2],
        shear: c[3],
        cross: anisotropic.then(|| c[4]),
    })
}

/// Degree-1 fit `strain ≈ offset + compliance · stress`.
fn fit_line(
    stress: ArrayView1<'_, f64>, strain: ArrayView1<'_, f64>, component: &'static str,
) -> MechanicsResult<(f64, f64)> {
    let (coefficients, rank) = polyfit(stress, strain, 1)?;
    if rank < 2 {
        warn!(rank, component, "insufficient rank for single-component compliance fit");
    }
    Ok((coefficients[0], coefficients[1]))
}

fn mean(values: ArrayView1<'_, f64>) -> f64 {
    values.mean().unwrap_or(0.0)
}

/// Validate a half-open window `[start, end)` against the series length.
pub(crate) fn check_window(series: &TimeSeries, start: usize, end: usize) -> MechanicsResult<()> {
    if start >= end {
        return Err(MechanicsError::EmptyWindow { start, end });
    }
    if end > series.len() {
        return Err(MechanicsError::WindowOutOfRange { end, len: series.len() });
    }
    Ok(())
}
