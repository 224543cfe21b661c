//! global — piecewise polynomial smoothing of a whole test.
//!
//! Purpose
//! -------
//! Fit every channel of a test with one global least-squares model whose
//! pieces follow the cycle boundary times. Unlike the local smoother, the
//! fit is continuous across cycle boundaries up to the chosen order, so the
//! smoothed curves carry no artificial jumps at load reversals.
//!
//! Key behaviors
//! -------------
//! - [`GlobalBasis::fit_matrix`] builds the design matrix:
//!   - global polynomial columns `((t − t0) / (tN − t0))^j` for
//!     `j < cycle_order` (a constant for `j = 0`);
//!   - for every cycle `[t1, t2)` the columns `⟨t − t1⟩^j` for
//!     `cycle_order ≤ j ≤ knot_order`, where `j = 0` is the step `t > t1`;
//!   - for every cycle and knot fraction `f`, with `t_k = t1 + (t2 − t1) f`,
//!     the column `⟨t − t_k⟩^knot_order`, or the step `t > t_k` when
//!     `knot_order = 0`.
//! - [`GlobalSmoother::smooth`] decomposes the matrix once and solves one
//!   least-squares problem per selected channel.
//!
//! Invariants & assumptions
//! ------------------------
//! - `knot_order >= cycle_order`; the number of columns is
//!   `cycle_order + cycles · (1 + knot_order − cycle_order + knots)`.
//! - Rank deficiency (e.g. a cycle without samples) is tolerated; the
//!   minimum-norm solution is used.
//!
//! Conventions
//! -----------
//! - `⟨x⟩ = max(x, 0)` (Macaulay bracket).
//! - Knot positions are fractions of each cycle's duration.
//!
//! Downstream usage
//! ----------------
//! - The cycle-time optimizer calls [`GlobalSmoother::smooth`] for every
//!   candidate set of cycle times.
//!
//! Testing notes
//! -------------
//! - Unit tests check the column layout on a small grid, exact
//!   reproduction of piecewise linear/quadratic data and option validation.
use ndarray::{Array2, ArrayView1};
use tracing::debug;

use crate::{
    data::{errors::DataError, selection::ChannelSelection, series::TimeSeries},
    numerics::{
        lstsq::LeastSquares,
        polynomial::{linspace, macaulay},
    },
    smoothing::errors::{SmoothingError, SmoothingResult},
};

/// Where the knots of each cycle sit.
#[derive(Debug, Clone, PartialEq)]
pub enum KnotPlacement {
    /// `n` uniformly spaced interior knots: `linspace(0, 1, n + 2)[1..=n]`.
    Count(usize),
    /// Explicit fractions of the cycle duration, each in `[0, 1]`.
    Fractions(Vec<f64>),
}

impl KnotPlacement {
    /// Knot positions as fractions of the cycle duration.
    pub fn fractions(&self) -> Vec<f64> {
        match self {
            KnotPlacement::Count(n) => {
                let grid = linspace(0.0, 1.0, n + 2);
                grid.iter().skip(1).take(*n).copied().collect()
            }
            KnotPlacement::Fractions(f) => f.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            KnotPlacement::Count(n) => *n,
            KnotPlacement::Fractions(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// GlobalBasis — layout of the global piecewise polynomial.
///
/// Fields
/// ------
/// - `knots`: per-cycle knot placement.
/// - `knot_order`: polynomial order inside a cycle (and of knot terms).
/// - `cycle_order`: continuity order across cycle boundaries; also the
///   number of global polynomial columns.
///
/// Invariants
/// ----------
/// - `knot_order >= cycle_order`.
/// - Knot fractions are finite and within `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalBasis {
    knots: KnotPlacement,
    knot_order: usize,
    cycle_order: usize,
}

impl Default for GlobalBasis {
    /// Ten knots per cycle, cubic pieces, no enforced continuity.
    fn default() -> Self {
        GlobalBasis { knots: KnotPlacement::Count(10), knot_order: 3, cycle_order: 0 }
    }
}

impl GlobalBasis {
    /// Validate and build a basis layout.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::InvalidOrders` if `knot_order < cycle_order`.
    /// - `SmoothingError::InvalidKnotPosition` for a fraction outside `[0, 1]`.
    pub fn new(knots: KnotPlacement, knot_order: usize, cycle_order: usize) -> SmoothingResult<Self> {
        if knot_order < cycle_order {
            return Err(SmoothingError::InvalidOrders { knot_order, cycle_order });
        }
        if let KnotPlacement::Fractions(fractions) = &knots {
            if let Some((index, &value)) =
                fractions.iter().enumerate().find(|(_, f)| !(f.is_finite() && (0.0..=1.0).contains(*f)))
            {
                return Err(SmoothingError::InvalidKnotPosition { index, value });
            }
        }
        Ok(GlobalBasis { knots, knot_order, cycle_order })
    }

    pub fn knots(&self) -> &KnotPlacement {
        &self.knots
    }

    pub fn knot_order(&self) -> usize {
        self.knot_order
    }

    pub fn cycle_order(&self) -> usize {
        self.cycle_order
    }

    /// Number of basis columns for `num_cycles` cycles.
    pub fn num_params(&self, num_cycles: usize) -> usize {
        self.cycle_order
            + num_cycles * (1 + self.knot_order - self.cycle_order + self.knots.len())
    }

    /// Build the design matrix for `time` and cycle boundary times.
    ///
    /// Parameters
    /// ----------
    /// - `time`: `ArrayView1<f64>`, N ≥ 1 sample times.
    /// - `cycle_times`: `&[f64]`, C + 1 ≥ 2 finite boundary times; cycle `c`
    ///   spans `[cycle_times[c], cycle_times[c + 1])`.
    ///
    /// Returns
    /// -------
    /// `SmoothingResult<Array2<f64>>` of shape `(N, num_params(C))`.
    ///
    /// Errors
    /// ------
    /// - `SmoothingError::TooFewCycleTimes` for fewer than two cycle times.
    /// - `SmoothingError::InvalidCycleTime` for a non-finite cycle time.
    /// - `SmoothingError::DegenerateTimeSpan` when global columns of order ≥ 1
    ///   are requested and `time` has zero span.
    pub fn fit_matrix(&self, time: ArrayView1<'_, f64>, cycle_times: &[f64]) -> SmoothingResult<Array2<f64>> {
        if cycle_times.len() < 2 {
            return Err(SmoothingError::TooFewCycleTimes { count: cycle_times.len() });
        }
        if let Some((index, &value)) = cycle_times.iter().enumerate().find(|(_, t)| !t.is_finite()) {
            return Err(SmoothingError::InvalidCycleTime { index, value });
        }
        let (t0, tn) = match (time.first(), time.last()) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return Err(SmoothingError::Data(DataError::EmptySeries)),
        };
        let span = tn - t0;
        if self.cycle_order > 1 && span <= 0.0 {
            return Err(SmoothingError::DegenerateTimeSpan { start: t0, end: tn });
        }

        let fractions = self.knots.fractions();
        let num_cycles = cycle_times.len() - 1;
        let mut a = Array2::<f64>::zeros((time.len(), self.num_params(num_cycles)));

        let mut col = 0;
        for j in 0..self.cycle_order {
            for (i, &t) in time.iter().enumerate() {
                a[[i, col]] = if j == 0 { 1.0 } else { ((t - t0) / span).powi(j as i32) };
            }
            col += 1;
        }

        for window in cycle_times.windows(2) {
            let (t1, t2) = (window[0], window[1]);
            for j in self.cycle_order..=self.knot_order {
                for (i, &t) in time.iter().enumerate() {
                    a[[i, col]] = power_or_step(t - t1, j);
                }
                col += 1;
            }
            for &fraction in &fractions {
                let tk = t1 + (t2 - t1) * fraction;
                for (i, &t) in time.iter().enumerate() {
                    a[[i, col]] = power_or_step(t - tk, self.knot_order);
                }
                col += 1;
            }
        }
        Ok(a)
    }
}

/// `⟨x⟩^order`, or the step `x > 0` for order 0.
fn power_or_step(x: f64, order: usize) -> f64 {
    if order == 0 {
        if x > 0.0 { 1.0 } else { 0.0 }
    } else {
        macaulay(x).powi(order as i32)
    }
}

/// GlobalSmoother — fits all selected channels against one global basis.
///
/// Fields
/// ------
/// - `basis`: [`GlobalBasis`] layout.
/// - `channels`: channels to smooth (default: all except `time`, `stp`).
/// - `max_index`: optional truncation to the first `max_index` samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalSmoother {
    basis: GlobalBasis,
    channels: ChannelSelection,
    max_index: Option<usize>,
}

impl GlobalSmoother {
    pub fn new(basis: GlobalBasis) -> Self {
        GlobalSmoother { basis, channels: ChannelSelection::default(), max_index: None }
    }

    pub fn with_channels(mut self, channels: ChannelSelection) -> Self {
        self.channels = channels;
        self
    }

    /// Only use the first `max_index` samples.
    pub fn with_max_index(mut self, max_index: Option<usize>) -> Self {
        self.max_index = max_index;
        self
    }

    pub fn basis(&self) -> &GlobalBasis {
        &self.basis
    }

    pub fn channels(&self) -> &ChannelSelection {
        &self.channels
    }

    pub fn max_index(&self) -> Option<usize> {
        self.max_index
    }

    /// Smooth the selected channels for the given cycle times.
    ///
    /// Parameters
    /// ----------
    /// - `series`: `&TimeSeries` with a `time` channel.
    /// - `cycle_times`: `&[f64]` cycle boundary times (≥ 2).
    ///
    /// Returns
    /// -------
    /// `SmoothingResult<TimeSeries>`
    ///   Series (truncated to `max_index` if set) whose selected channels are
    ///   replaced by their fitted values.
    ///
    /// Errors
    /// ------
    /// - Basis construction errors (see [`GlobalBasis::fit_matrix`]).
    /// - `SmoothingError::Data` for missing channels or invalid truncation.
    /// - `SmoothingError::Numerics` if the decomposition fails.
    pub fn smooth(&self, series: &TimeSeries, cycle_times: &[f64]) -> SmoothingResult<TimeSeries> {
        let data = match self.max_index {
            Some(n) => series.truncated(n)?,
            None => series.clone(),
        };
        let names = self.channels.resolve(&data)?;
        let a = self.basis.fit_matrix(data.time()?.view(), cycle_times)?;
        let solver = LeastSquares::new(&a)?;
        let rank = solver.rank();
        if rank < solver.ncols() {
            debug!(rank, columns = solver.ncols(), "global basis is rank deficient");
        }

        let mut out = data.clone();
        for name in names {
            let coefficients = solver.solve(data.channel(&name)?.view())?;
            out.insert(name, a.dot(&coefficients))?;
        }
        Ok(out)
    }
}
