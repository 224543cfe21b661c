//! mechanics — von Mises metrics, elastic compliance and yield points.
//!
//! Purpose
//! -------
//! Material-level analysis of axial-torsional test data: effective stress
//! and strain, elastic parameters of a loading segment and its offset yield
//! point.
//!
//! Key behaviors
//! -------------
//! - [`von_mises`]: effective stress/strain and continuous stress-plane
//!   angles.
//! - [`compliance`]: interleaved least-squares identification of strain
//!   offsets and (an)isotropic compliances.
//! - [`yield_point`]: elastic window selection, plastic strain and offset
//!   yield point per segment, aggregated into [`YieldInfo`].
//!
//! Conventions
//! -----------
//! - Channels are read by the names in `data::series` (`sig`, `eps`, `tau`,
//!   `gam`, `time`).
//! - Failures are [`MechanicsError`]; missing threshold crossings are Bounds
//!   errors.

pub mod compliance;
pub mod errors;
pub mod von_mises;
pub mod yield_point;

// ---- Re-exports (primary public surface) ----
pub use self::compliance::{ComplianceOptions, ComplianceVector, solve as solve_compliance};
pub use self::errors::{MechanicsError, MechanicsResult};
pub use self::von_mises::{
    effective_strain, effective_strain_array, effective_stress, effective_stress_array,
    polar_angle, stress_polar,
};
pub use self::yield_point::{
    DEFAULT_DELTA_VM, DEFAULT_YIELD_OFFSET, YieldInfo, YieldOptions, YieldPoint, find_yield,
    first_exceedance, yield_point,
};
