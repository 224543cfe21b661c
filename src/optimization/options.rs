//! Options for the cycle-time search.
use crate::{
    optimization::errors::{OptError, OptResult},
    smoothing::global::{GlobalBasis, KnotPlacement},
};

/// Default maximum change of any cycle time.
pub const DEFAULT_DT_MAX: f64 = 0.1;

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Cycle-time search configuration.
///
/// Fields:
/// - `dt_max: f64` — largest allowed change of a cycle time; also sets the
///   initial step (`dt_max / 10`), the convergence tolerance
///   (`dt_max / 1000`) and the width of the local error kernel (`3 dt_max`).
/// - `max_iter: usize` — iteration cap.
/// - `basis: GlobalBasis` — global smoothing basis used by the objective.
/// - `max_index: Option<usize>` — only use the first `max_index` samples.
/// - `fix_endpoints: bool` — keep the first and last cycle times fixed.
/// - `verbose: bool` — attach a terminal observer (behind `obs_slog`).
///
/// Default:
/// - `dt_max = 0.1`, `max_iter = 100`
/// - `basis`: no knots, `knot_order = 1`, `cycle_order = 1` (piecewise
///   linear and continuous, matching triangular loading)
/// - `max_index = None`, `fix_endpoints = false`, `verbose = false`
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTimeOptions {
    pub dt_max: f64,
    pub max_iter: usize,
    pub basis: GlobalBasis,
    pub max_index: Option<usize>,
    pub fix_endpoints: bool,
    pub verbose: bool,
}

impl Default for CycleTimeOptions {
    fn default() -> Self {
        CycleTimeOptions {
            dt_max: DEFAULT_DT_MAX,
            max_iter: DEFAULT_MAX_ITER,
            basis: linear_basis(),
            max_index: None,
            fix_endpoints: false,
            verbose: false,
        }
    }
}

impl CycleTimeOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - `OptError::InvalidDtMax` if `dt_max` is non-finite or not positive.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        dt_max: f64, max_iter: usize, basis: GlobalBasis, max_index: Option<usize>,
        fix_endpoints: bool, verbose: bool,
    ) -> OptResult<Self> {
        let opts = CycleTimeOptions { dt_max, max_iter, basis, max_index, fix_endpoints, verbose };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check the public fields (they may have been edited after `new`).
    pub fn validate(&self) -> OptResult<()> {
        if !self.dt_max.is_finite() || self.dt_max <= 0.0 {
            return Err(OptError::InvalidDtMax {
                value: self.dt_max,
                reason: "Maximum time change must be finite and greater than zero.",
            });
        }
        if self.max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter: self.max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(())
    }

    /// Initial step of every cycle time.
    pub fn initial_step(&self) -> f64 {
        self.dt_max / 10.0
    }

    /// Convergence tolerance on the change of every cycle time.
    pub fn change_tol(&self) -> f64 {
        self.dt_max / 1000.0
    }

    /// Time at which the local error kernel has decayed to about 5 %.
    pub fn kernel_width(&self) -> f64 {
        3.0 * self.dt_max
    }
}

fn linear_basis() -> GlobalBasis {
    GlobalBasis::new(KnotPlacement::Count(0), 1, 1).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_dt_max() {
        let opts = CycleTimeOptions::default();

        assert_eq!(opts.basis.knot_order(), 1);
        assert_eq!(opts.basis.cycle_order(), 1);
        assert!(opts.basis.knots().is_empty());
        assert!((opts.initial_step() - 0.01).abs() < 1e-15);
        assert!((opts.change_tol() - 1e-4).abs() < 1e-15);
        assert!((opts.kernel_width() - 0.3).abs() < 1e-15);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let basis = GlobalBasis::default();
        assert!(matches!(
            CycleTimeOptions::new(0.0, 10, basis.clone(), None, true, false),
            Err(OptError::InvalidDtMax { .. })
        ));
        assert!(matches!(
            CycleTimeOptions::new(0.1, 0, basis, None, true, false),
            Err(OptError::InvalidMaxIter { max_iter: 0, .. })
        ));
    }
}
