//! solver — coordinate-wise quadratic search for cycle times.
//!
//! Purpose
//! -------
//! Refine every cycle time independently, assuming that the local error
//! `e_i` depends (almost) only on the `i`-th cycle time. The solver is an
//! argmin [`Solver`] so the run loop, iteration cap, best-parameter tracking
//! and observers come from argmin's `Executor`.
//!
//! Key behaviors
//! -------------
//! - A four-row history holds the latest offsets `Δt` from the initial
//!   times and the local errors they produced (row 0 newest).
//! - Iteration 0 moves every offset by `+step`. Iteration 1 keeps going by
//!   `+step` where the error decreased along that move and turns back by
//!   `−2·step` elsewhere.
//! - Later iterations fit `e = k2 Δt² + k1 Δt + k0` through the last three
//!   history entries per coordinate and jump to `−k1 / (2 k2)`. When the
//!   parabola is concave, the vertex is not finite or `|Δt| > dt_max`, the
//!   offset instead moves by `step` from the newest offset toward
//!   decreasing error.
//! - The step halves whenever the total error increases (after the first
//!   iteration).
//! - A rejected jump steps from the newest offset in the direction in which
//!   the secant slope points downhill, up or down; it is not a fixed step
//!   toward smaller offsets.
//! - All cycle times are refined by default. Optionally the first and last
//!   cycle times stay fixed at their initial values.
//! - The search has converged when every offset changed by less than the
//!   tolerance in the last iteration.
//!
//! Invariants & assumptions
//! ------------------------
//! - The parameter in the argmin state is always `t0 + Δt_newest`.
use argmin::core::{
    CostFunction, Error, IterState, KV, Problem, Solver, State, TerminationReason,
    TerminationStatus,
};
use ndarray::{Array1, Array2, s};

use crate::{
    numerics::polynomial::polyfit,
    optimization::{errors::OptError, objective::CycleTimeError},
};

/// argmin state used by the cycle-time search.
pub type CycleTimeState = IterState<Array1<f64>, (), (), (), (), f64>;

const HISTORY: usize = 4;

/// Offsets and local errors of the last four evaluations (row 0 newest).
#[derive(Debug, Clone, PartialEq)]
pub struct StepHistory {
    pub dt: Array2<f64>,
    pub fe: Array2<f64>,
}

impl StepHistory {
    /// Zero offsets with `fe0` as the error at the initial times.
    pub fn new(fe0: &Array1<f64>) -> Self {
        let n = fe0.len();
        let mut fe = Array2::zeros((HISTORY, n));
        fe.row_mut(0).assign(fe0);
        StepHistory { dt: Array2::zeros((HISTORY, n)), fe }
    }

    /// Newest offsets.
    pub fn latest(&self) -> Array1<f64> {
        self.dt.row(0).to_owned()
    }

    /// Record the local errors of the newest offsets.
    pub fn record(&mut self, fe: &Array1<f64>) {
        self.fe.row_mut(0).assign(fe);
    }

    /// Keep the newest offset of coordinate `j` at zero.
    pub fn pin(&mut self, j: usize) {
        if j < self.dt.ncols() {
            self.dt[[0, j]] = 0.0;
        }
    }

    /// Whether every offset moved by less than `tol` in the last update.
    pub fn converged(&self, tol: f64) -> bool {
        self.dt.row(0).iter().zip(self.dt.row(1).iter()).all(|(a, b)| (a - b).abs() < tol)
    }

    /// Shift the history down and propose new offsets in row 0.
    ///
    /// Parameters
    /// ----------
    /// - `step`: current fixed step.
    /// - `dt_max`: largest accepted quadratic jump.
    /// - `iteration`: 0-based iteration number.
    ///
    /// Notes
    /// -----
    /// - Row 0 keeps the previous offsets after the shift; iterations 0 and
    ///   1 move relative to them.
    pub fn advance(&mut self, step: f64, dt_max: f64, iteration: u64) {
        for i in (1..HISTORY).rev() {
            let (dt_prev, fe_prev) = (self.dt.row(i - 1).to_owned(), self.fe.row(i - 1).to_owned());
            self.dt.row_mut(i).assign(&dt_prev);
            self.fe.row_mut(i).assign(&fe_prev);
        }

        match iteration {
            0 => self.dt.row_mut(0).mapv_inplace(|d| d + step),
            1 => {
                for j in 0..self.dt.ncols() {
                    let downhill = self.secant_slope(j) < 0.0;
                    self.dt[[0, j]] += if downhill { step } else { -2.0 * step };
                }
            }
            _ => {
                for j in 0..self.dt.ncols() {
                    self.dt[[0, j]] = self.quadratic_step(j, step, dt_max);
                }
            }
        }
    }

    /// `(e1 − e2) / (Δt1 − Δt2)` for coordinate `j`.
    fn secant_slope(&self, j: usize) -> f64 {
        (self.fe[[1, j]] - self.fe[[2, j]]) / (self.dt[[1, j]] - self.dt[[2, j]])
    }

    fn quadratic_step(&self, j: usize, step: f64, dt_max: f64) -> f64 {
        let x = self.dt.slice(s![1..HISTORY, j]);
        let y = self.fe.slice(s![1..HISTORY, j]);
        let vertex = match polyfit(x, y, 2) {
            Ok((k, _)) if k[2] >= 0.0 => -k[1] / (2.0 * k[2]),
            _ => f64::NAN,
        };
        if vertex.is_finite() && vertex.abs() <= dt_max {
            vertex
        } else if self.secant_slope(j) < 0.0 {
            self.dt[[1, j]] + step
        } else {
            self.dt[[1, j]] - step
        }
    }
}

/// Coordinate-wise quadratic search over cycle times.
#[derive(Debug, Clone)]
pub struct CycleTimeSolver {
    dt_max: f64,
    tol: f64,
    step: f64,
    t0: Array1<f64>,
    history: Option<StepHistory>,
    last_error: f64,
    moved: bool,
    fix_endpoints: bool,
}

impl CycleTimeSolver {
    /// Solver with the given maximum jump, initial step and change tolerance.
    pub fn new(dt_max: f64, step: f64, tol: f64) -> Self {
        CycleTimeSolver {
            dt_max,
            tol,
            step,
            t0: Array1::zeros(0),
            history: None,
            last_error: f64::INFINITY,
            moved: false,
            fix_endpoints: false,
        }
    }

    /// Keep the first and last cycle times at their initial values.
    pub fn with_fixed_endpoints(mut self, fix: bool) -> Self {
        self.fix_endpoints = fix;
        self
    }

    /// Current fixed step.
    pub fn step(&self) -> f64 {
        self.step
    }
}

impl<O> Solver<O, CycleTimeState> for CycleTimeSolver
where
    O: CostFunction<Param = Array1<f64>, Output = CycleTimeError>,
{
    const NAME: &'static str = "Cycle time quadratic search";

    fn init(
        &mut self, problem: &mut Problem<O>, state: CycleTimeState,
    ) -> Result<(CycleTimeState, Option<KV>), Error> {
        let t0 = state.get_param().cloned().ok_or_else(|| {
            Error::from(OptError::NotInitialized { text: "initial cycle times".to_string() })
        })?;
        let err = problem.cost(&t0)?;
        self.history = Some(StepHistory::new(&err.local));
        self.last_error = err.total;
        self.t0 = t0.clone();
        self.moved = false;
        Ok((state.param(t0).cost(err.total), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, state: CycleTimeState,
    ) -> Result<(CycleTimeState, Option<KV>), Error> {
        let iteration = state.get_iter();
        let history = self.history.as_mut().ok_or_else(|| {
            Error::from(OptError::NotInitialized { text: "step history".to_string() })
        })?;
        history.advance(self.step, self.dt_max, iteration);
        if self.fix_endpoints {
            history.pin(0);
            history.pin(self.t0.len().saturating_sub(1));
        }
        let param = &self.t0 + &history.latest();
        let err = problem.cost(&param)?;
        history.record(&err.local);

        if err.total > self.last_error && iteration > 0 {
            self.step /= 2.0;
        }
        self.last_error = err.total;
        self.moved = true;
        Ok((state.param(param).cost(err.total), None))
    }

    fn terminate(&mut self, _state: &CycleTimeState) -> TerminationStatus {
        match &self.history {
            Some(history) if self.moved && history.converged(self.tol) => {
                TerminationStatus::Terminated(TerminationReason::SolverConverged)
            }
            _ => TerminationStatus::NotTerminated,
        }
    }
}
