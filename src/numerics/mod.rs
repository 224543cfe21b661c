//! numerics — least squares and polynomial helpers.
//!
//! Purpose
//! -------
//! Provide the single linear-algebra entry point used by every fitting routine
//! in the crate. Design matrices are assembled with `ndarray`; the solve runs
//! through an `nalgebra` SVD so rank-deficient systems yield minimum-norm
//! solutions instead of failures.
//!
//! Key behaviors
//! -------------
//! - [`lstsq::LeastSquares`] decomposes once and solves many right-hand sides.
//! - [`lstsq::lstsq`] is the one-shot form returning coefficients and rank.
//! - [`polynomial`] holds `linspace`, `polyfit`/`polyval` (ascending powers)
//!   and the Macaulay bracket.
//!
//! Conventions
//! -----------
//! - All routines operate on `f64` and never panic on malformed shapes; they
//!   return [`errors::NumericsError`].

pub mod errors;
pub mod lstsq;
pub mod polynomial;

// ---- Re-exports (primary public surface) ----
pub use self::errors::{NumResult, NumericsError};
pub use self::lstsq::{LeastSquares, LstsqSolution, lstsq};
pub use self::polynomial::{linspace, macaulay, polyfit, polyval};
