//! optimization — cycle-time search driven by the global smoother.
//!
//! Purpose
//! -------
//! Refine the cycle boundary times of a test so that the global piecewise
//! polynomial fits the measured channels as well as possible. Recorded step
//! changes lag the true load reversals; the refined times mark where the
//! signals actually change slope.
//!
//! Key behaviors
//! -------------
//! - [`objective::CycleTimeObjective`] implements argmin's `CostFunction`,
//!   returning the scaled total residual and one kernel-weighted residual
//!   per cycle time.
//! - [`solver::CycleTimeSolver`] implements argmin's `Solver`: a
//!   coordinate-wise quadratic search with fixed-step fallbacks.
//! - [`run::run_cycle_time_search`] wires both into an `Executor` and maps
//!   the final state into a [`run::CycleTimeOutcome`].
//! - Backend and objective failures surface as [`errors::OptError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every local error depends mainly on its own cycle time; the kernel
//!   width `3 · dt_max` keeps neighbouring cycle times apart for reasonable
//!   cycle durations.
//! - The best parameter (lowest total error) is returned, not the last one.
//!
//! Conventions
//! -----------
//! - Non-convergence is reported through `CycleTimeOutcome::converged` and
//!   a `tracing` warning, never as an error.
//! - With the `obs_slog` feature and `verbose = true`, a terminal slog
//!   observer prints every iteration.
//!
//! Testing notes
//! -------------
//! - `solver` tests check the history update rules on hand-made parabolas.
//! - `run` tests recover perturbed kink times of piecewise linear data.

pub mod errors;
pub mod objective;
pub mod options;
pub mod run;
pub mod solver;

// ---- Re-exports (primary public surface) ----
pub use self::errors::{OptError, OptResult};
pub use self::objective::{CycleTimeError, CycleTimeObjective};
pub use self::options::{CycleTimeOptions, DEFAULT_DT_MAX, DEFAULT_MAX_ITER};
pub use self::run::{CycleTimeOutcome, optimize_cycle_times, run_cycle_time_search};
pub use self::solver::{CycleTimeSolver, StepHistory};
