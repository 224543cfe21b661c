//! data — time-series container, channel selection and specimen conversion.
//!
//! Purpose
//! -------
//! Own the input data model of the crate: a validated [`TimeSeries`] of
//! equal-length named channels, the [`ChannelSelection`] used by every
//! "process all data channels" operation, and the conversion from raw
//! machine channels of a tubular specimen into engineering stresses and
//! strains.
//!
//! Key behaviors
//! -------------
//! - [`series`]: construction-time validation (lengths, finiteness,
//!   monotone `time`/`stp`), lookup, truncation and interpolation.
//! - [`selection`]: explicit channel lists or "all except" lists, with the
//!   default excluding `time` and `stp`.
//! - [`specimen`]: thin-walled tube geometry and the raw-to-engineering
//!   conversion.
//!
//! Downstream usage
//! ----------------
//! - Every analysis module borrows a `&TimeSeries` immutably and returns
//!   fresh outputs.

pub mod errors;
pub mod selection;
pub mod series;
pub mod specimen;

// ---- Re-exports (primary public surface) ----
pub use self::errors::{DataError, DataResult};
pub use self::selection::ChannelSelection;
pub use self::series::{EPS, GAM, SIG, STP, TAU, TIME, TimeSeries};
pub use self::specimen::{RawChannels, SpecimenGeometry};
