//! smoothing — local (per-segment) and global (whole-test) smoothing.
//!
//! Purpose
//! -------
//! Remove measurement noise from test channels without smearing the sharp
//! changes at load reversals. Two engines are provided:
//!
//! - [`local::LocalSmoother`] fits each segment independently with a
//!   [`filters::LocalFilter`] (polynomial, linear segments, splines or a
//!   custom function).
//! - [`global::GlobalSmoother`] fits the whole test with one piecewise
//!   polynomial whose pieces follow the cycle boundary times, keeping the
//!   result continuous up to a chosen order.
//!
//! Key behaviors
//! -------------
//! - Both engines return a fresh [`TimeSeries`](crate::data::TimeSeries)
//!   and leave unselected channels untouched.
//! - Splines use a truncated power basis ([`spline::SplineModel`]) solved
//!   through the crate's SVD least squares.
//!
//! Downstream usage
//! ----------------
//! - The cycle-time optimizer drives the global smoother repeatedly; the
//!   local smoother is typically run before yield-point evaluation.

pub mod errors;
pub mod filters;
pub mod global;
pub mod local;
pub mod spline;

// ---- Re-exports (primary public surface) ----
pub use self::errors::{SmoothingError, SmoothingResult};
pub use self::filters::{DEFAULT_KNOT_FRACTION, FilterFn, KnotCount, LocalFilter, uniform_knots};
pub use self::global::{GlobalBasis, GlobalSmoother, KnotPlacement};
pub use self::local::{FilterSpec, LocalSmoother};
pub use self::spline::SplineModel;
