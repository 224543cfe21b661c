//! Execution helpers that run the cycle-time search through argmin's
//! `Executor` and return crate-level results.
#[cfg(feature = "obs_slog")]
use argmin::core::observers::ObserverMode;
use argmin::core::{Executor, State, TerminationReason, TerminationStatus};
use ndarray::Array1;
use tracing::{debug, warn};

use crate::{
    data::{selection::ChannelSelection, series::TimeSeries},
    optimization::{
        errors::{OptError, OptResult},
        objective::CycleTimeObjective,
        options::CycleTimeOptions,
        solver::CycleTimeSolver,
    },
};

/// Result of a cycle-time search.
///
/// - `cycle_times`: best cycle times found (lowest total error).
/// - `error`: total smoothing error at `cycle_times`.
/// - `converged`: `true` if every cycle time settled within tolerance.
/// - `status`: human-readable termination status.
/// - `iterations`: number of solver iterations performed.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTimeOutcome {
    pub cycle_times: Array1<f64>,
    pub error: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
}

impl CycleTimeOutcome {
    /// Build an outcome from raw solver state.
    ///
    /// # Errors
    /// - `OptError::MissingBestParam` if the solver produced no parameter.
    /// - `OptError::NonFiniteCost` if the best error is not finite.
    pub fn new(
        best: Option<Array1<f64>>, error: f64, status: &TerminationStatus, iterations: u64,
    ) -> OptResult<Self> {
        let cycle_times = best.ok_or(OptError::MissingBestParam)?;
        if !error.is_finite() {
            return Err(OptError::NonFiniteCost { value: error });
        }
        let converged = matches!(
            status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        let status = match status {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            TerminationStatus::Terminated(reason) => format!("{reason:?}"),
        };
        Ok(CycleTimeOutcome { cycle_times, error, converged, status, iterations: iterations as usize })
    }
}

/// Refine cycle times so that the global smoothing residual is minimal.
///
/// Parameters
/// ----------
/// - `series`: `&TimeSeries` with a `time` channel.
/// - `initial`: `&[f64]` initial cycle times (≥ 2, finite).
/// - `channels`: `&ChannelSelection` channels the error is measured on;
///   usually the controlled channel(s).
/// - `opts`: `&CycleTimeOptions`.
///
/// Returns
/// -------
/// `OptResult<CycleTimeOutcome>`
///   The best cycle times found. Hitting the iteration cap is not an error;
///   it is reported through `converged = false` and a `tracing` warning.
///
/// Errors
/// ------
/// - `OptError::InvalidDtMax` / `OptError::InvalidMaxIter` for bad options.
/// - `OptError::TooFewCycleTimes` / `OptError::InvalidCycleTime` for bad
///   initial times.
/// - `OptError::NoChannels` / `OptError::Data` for a bad selection.
/// - `OptError::Smoothing` if the global fit fails for a candidate.
pub fn run_cycle_time_search(
    series: &TimeSeries, initial: &[f64], channels: &ChannelSelection, opts: &CycleTimeOptions,
) -> OptResult<CycleTimeOutcome> {
    opts.validate()?;
    if initial.len() < 2 {
        return Err(OptError::TooFewCycleTimes { count: initial.len() });
    }
    if let Some((index, &value)) = initial.iter().enumerate().find(|(_, t)| !t.is_finite()) {
        return Err(OptError::InvalidCycleTime { index, value });
    }

    let objective = CycleTimeObjective::new(series, channels, opts)?;
    debug!(
        channels = ?objective.channels(),
        cycles = initial.len() - 1,
        dt_max = opts.dt_max,
        "starting cycle-time search"
    );
    let solver = CycleTimeSolver::new(opts.dt_max, opts.initial_step(), opts.change_tol())
        .with_fixed_endpoints(opts.fix_endpoints);
    let t0 = Array1::from(initial.to_vec());
    let max_iter = opts.max_iter as u64;

    let mut executor = Executor::new(objective, solver);
    executor = executor.configure(|state| state.param(t0).max_iters(max_iter));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, ObserverMode::Always);
    }

    let result = executor.run()?;
    let state = result.state();
    let outcome = CycleTimeOutcome::new(
        state.get_best_param().cloned(),
        state.get_best_cost(),
        state.get_termination_status(),
        state.get_iter(),
    )?;
    if outcome.converged {
        debug!(iterations = outcome.iterations, error = outcome.error, "cycle-time search converged");
    } else {
        warn!(
            iterations = outcome.iterations,
            status = %outcome.status,
            "cycle-time search did not converge; returning best cycle times found"
        );
    }
    Ok(outcome)
}

/// Convenience wrapper returning only the refined cycle times.
///
/// See [`run_cycle_time_search`] for parameters and errors.
pub fn optimize_cycle_times(
    series: &TimeSeries, initial: &[f64], channels: &ChannelSelection, opts: &CycleTimeOptions,
) -> OptResult<Array1<f64>> {
    run_cycle_time_search(series, initial, channels, opts).map(|outcome| outcome.cycle_times)
}
