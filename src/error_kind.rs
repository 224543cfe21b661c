//! error_kind — shared classification for the per-module error enums.
//!
//! Purpose
//! -------
//! Every subtree of the crate owns its own error enum (`DataError`,
//! `CycleError`, `SmoothingError`, ...). Callers that only need to know
//! *what kind* of failure happened (bad configuration, misuse of a stateful
//! object, a search that ran off the end of the data) can ask any of them for
//! an [`ErrorKind`] instead of matching on every variant.
//!
//! Conventions
//! -----------
//! - `Configuration`: invalid options or option combinations, rejected before
//!   any numerical work.
//! - `State`: an operation was called on an object in the wrong state
//!   (e.g. evaluating a spline before fitting it).
//! - `Bounds`: a search or index fell outside the available samples.
//! - `Data`: the input series violates its invariants.
//! - `Numerical`: a linear-algebra backend failed.
//! - `Backend`: the optimization backend reported an error.

/// Coarse classification of crate errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    State,
    Bounds,
    Data,
    Numerical,
    Backend,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::State => "state error",
            ErrorKind::Bounds => "bounds error",
            ErrorKind::Data => "data error",
            ErrorKind::Numerical => "numerical error",
            ErrorKind::Backend => "backend error",
        };
        write!(f, "{name}")
    }
}
