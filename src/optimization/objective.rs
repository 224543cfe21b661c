//! objective — smoothing residual as a function of the cycle times.
//!
//! Purpose
//! -------
//! Score a candidate set of cycle times by how well the global piecewise
//! polynomial fits the selected channels. Besides the total error, a
//! per-cycle-time error is returned that only weights residuals near that
//! time, which lets the solver update every cycle time independently.
//!
//! Key behaviors
//! -------------
//! - Total error: `Σ_c ‖r_c‖ · s_c` with residual `r_c = smooth(c) − c` and
//!   channel scale `s_c = 1 / (max c − min c)` (1 for constant channels).
//! - Local error: `e_i = Σ_c ‖r_c · w(t − t_i)‖ · s_c` with the kernel
//!   `w(x) = exp(−3 (x / t5)²)`, which is 1 at `x = 0` and about 5 % at
//!   `|x| = t5`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Channel scales come from the full series, also when `max_index`
//!   truncates the fit.
//! - Errors raised while smoothing are wrapped as [`OptError`] and travel
//!   through argmin unchanged.
use argmin::core::{CostFunction, Error};
use ndarray::{Array1, s};

use crate::{
    data::{selection::ChannelSelection, series::TimeSeries},
    optimization::{
        errors::{OptError, OptResult},
        options::CycleTimeOptions,
    },
    smoothing::global::GlobalSmoother,
};

/// Total and per-cycle-time smoothing error.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTimeError {
    pub total: f64,
    pub local: Array1<f64>,
}

/// `exp(−3 (x / t5)²)`.
#[inline]
pub fn kernel_weight(x: f64, t5: f64) -> f64 {
    (-3.0 * (x / t5).powi(2)).exp()
}

/// Smoothing-residual objective over a borrowed series.
#[derive(Debug, Clone)]
pub struct CycleTimeObjective<'a> {
    series: &'a TimeSeries,
    smoother: GlobalSmoother,
    channels: Vec<String>,
    scales: Vec<f64>,
    kernel_width: f64,
}

impl<'a> CycleTimeObjective<'a> {
    /// Build the objective for the selected channels.
    ///
    /// # Errors
    /// - `OptError::NoChannels` if the selection resolves to nothing.
    /// - `OptError::Data` for unknown channels.
    pub fn new(
        series: &'a TimeSeries, channels: &ChannelSelection, opts: &CycleTimeOptions,
    ) -> OptResult<Self> {
        let names = channels.resolve(series)?;
        if names.is_empty() {
            return Err(OptError::NoChannels);
        }
        let mut scales = Vec::with_capacity(names.len());
        for name in &names {
            let values = series.channel(name)?;
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let range = max - min;
            scales.push(if range > 0.0 { 1.0 / range } else { 1.0 });
        }
        let smoother = GlobalSmoother::new(opts.basis.clone())
            .with_channels(ChannelSelection::Only(names.clone()))
            .with_max_index(opts.max_index);
        Ok(CycleTimeObjective {
            series,
            smoother,
            channels: names,
            scales,
            kernel_width: opts.kernel_width(),
        })
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Evaluate total and local errors for `cycle_times`.
    pub fn evaluate(&self, cycle_times: &Array1<f64>) -> OptResult<CycleTimeError> {
        let times = cycle_times.to_vec();
        let smoothed = self.smoother.smooth(self.series, &times)?;
        let n = smoothed.len();
        let time = smoothed.time()?;
        let weights: Vec<Array1<f64>> =
            times.iter().map(|&ti| time.mapv(|t| kernel_weight(t - ti, self.kernel_width))).collect();

        let mut total = 0.0;
        let mut local = Array1::<f64>::zeros(times.len());
        for (name, scale) in self.channels.iter().zip(&self.scales) {
            let data = self.series.channel(name)?.slice(s![..n]);
            let residual = smoothed.channel(name)? - &data;
            total += l2_norm(&residual) * scale;
            for (e, w) in local.iter_mut().zip(&weights) {
                *e += l2_norm(&(&residual * w)) * scale;
            }
        }
        if !total.is_finite() {
            return Err(OptError::NonFiniteCost { value: total });
        }
        Ok(CycleTimeError { total, local })
    }
}

impl CostFunction for CycleTimeObjective<'_> {
    type Param = Array1<f64>;
    type Output = CycleTimeError;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.evaluate(param)?)
    }
}

fn l2_norm(v: &Array1<f64>) -> f64 {
    v.dot(v).sqrt()
}
