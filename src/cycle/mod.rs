//! cycle — segment detection, boundary groups and per-segment aggregation.
//!
//! Purpose
//! -------
//! Split a cyclic test into its loading segments. A cycle has K boundary
//! types (K = 2 for peak/valley loading); the detector finds the boundary
//! samples from the machine's step counter and the aggregator reduces channel
//! values over each segment.
//!
//! Key behaviors
//! -------------
//! - [`detect`]: step-counter change indices, round-robin grouping and
//!   metric-filtered detection.
//! - [`groups`]: validated boundary groups and their pairing into segments.
//! - [`aggregate`]: midpoint, difference or custom reductions per segment.
//!
//! Invariants & assumptions
//! ------------------------
//! - Boundary groups are a round-robin split of one strictly increasing
//!   sequence; segments therefore always satisfy `start < end`.
//! - Groups are computed fresh for each analysis and never mutated.
//!
//! Downstream usage
//! ----------------
//! - The local smoother consumes the flattened boundaries; the yield-point
//!   finder iterates over [`groups::SegmentBoundaryGroups::segments`].
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests reproducing the reference scenarios
//!   (step-counter split for K = 1, 2, 3, strain-change detection, midpoint
//!   and difference values).

pub mod aggregate;
pub mod detect;
pub mod errors;
pub mod groups;

// ---- Re-exports (primary public surface) ----
pub use self::aggregate::{Reduction, SegmentValues, aggregate, diff_values, mid_values};
pub use self::detect::{
    DEFAULT_STEP_TOL, DetectOptions, detect, detect_by_metric, detect_by_strain_change,
    step_change_indices,
};
pub use self::errors::{CycleError, CycleResult};
pub use self::groups::{Segment, SegmentBoundaryGroups};
