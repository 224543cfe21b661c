//! yield_point — offset yield points of every loading segment.
//!
//! Purpose
//! -------
//! For each segment between two boundary indices, identify the elastic
//! compliance from the start of the segment and locate the point where the
//! effective plastic strain change first reaches a given offset. Every
//! channel of the series is interpolated to that point.
//!
//! Key behaviors
//! -------------
//! - The elastic window of a segment `[start, end)` runs from the first
//!   sample whose von Mises stress change (relative to `start`) exceeds
//!   `delta_vm.0` up to, but excluding, the first sample exceeding
//!   `delta_vm.1`.
//! - Plastic strain is total minus elastic strain, referenced to zero at the
//!   first sample whose stress change exceeds `delta_vm.0`.
//! - The yield point lies between the first sample whose effective plastic
//!   strain exceeds `offset` and its predecessor, at the linear fraction
//!   where the effective plastic strain equals `offset`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every threshold search is an explicit first-exceedance scan. A missing
//!   crossing is a `MechanicsError::ThresholdNotReached` (Bounds kind), never
//!   a silent fallback to the first sample.
//! - Segments are half-open: the end boundary belongs to the next segment.
//!
//! Conventions
//! -----------
//! - [`YieldInfo`] holds one array per segment type, with one entry per
//!   segment of that type. Moduli of components that were not requested
//!   are NaN.
//!
//! Testing notes
//! -------------
//! - Unit tests compare against direct interpolation of a prescribed
//!   plastic strain and run ideal-plasticity sawtooth data end to end.
use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1, s};
use tracing::debug;

use crate::{
    cycle::groups::{Segment, SegmentBoundaryGroups},
    data::{
        errors::DataError,
        series::{EPS, GAM, SIG, TAU, TIME, TimeSeries},
    },
    mechanics::{
        compliance::{ComplianceOptions, ComplianceVector, check_window, solve},
        errors::{MechanicsError, MechanicsResult},
        von_mises::{effective_strain_array, effective_stress_array},
    },
};

/// Default effective plastic strain offset defining yield.
pub const DEFAULT_YIELD_OFFSET: f64 = 1e-3;

/// Default von Mises stress-change window of the elastic fit.
pub const DEFAULT_DELTA_VM: (f64, f64) = (-1.0, 200.0);

/// Yield-point search configuration.
///
/// Fields:
/// - `offset: f64` — effective plastic strain change defining yield.
/// - `delta_vm: (f64, f64)` — von Mises stress changes bounding the elastic
///   fit. The lower value also sets the plastic strain zero point; with the
///   default `-1` the first sample of each segment is used. Yield below the
///   lower value cannot be detected.
/// - `axial`, `shear`, `anisotropic` — compliance components, see
///   [`ComplianceOptions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldOptions {
    pub offset: f64,
    pub delta_vm: (f64, f64),
    pub axial: bool,
    pub shear: bool,
    pub anisotropic: bool,
}

impl Default for YieldOptions {
    fn default() -> Self {
        YieldOptions {
            offset: DEFAULT_YIELD_OFFSET,
            delta_vm: DEFAULT_DELTA_VM,
            axial: true,
            shear: true,
            anisotropic: false,
        }
    }
}

impl YieldOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// - `MechanicsError::InvalidOffset` if `offset` is not finite and positive.
    /// - `MechanicsError::InvalidStressWindow` unless `delta_vm.0 < delta_vm.1`
    ///   with both finite.
    /// - Compliance configuration errors, see [`ComplianceOptions::new`].
    pub fn new(
        offset: f64, delta_vm: (f64, f64), axial: bool, shear: bool, anisotropic: bool,
    ) -> MechanicsResult<Self> {
        let opts = YieldOptions { offset, delta_vm, axial, shear, anisotropic };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> MechanicsResult<()> {
        if !self.offset.is_finite() || self.offset <= 0.0 {
            return Err(MechanicsError::InvalidOffset { value: self.offset });
        }
        let (min, max) = self.delta_vm;
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(MechanicsError::InvalidStressWindow { min, max });
        }
        self.compliance_options().validate()
    }

    pub fn compliance_options(&self) -> ComplianceOptions {
        ComplianceOptions { anisotropic: self.anisotropic, axial: self.axial, shear: self.shear }
    }
}

/// Index of the first value strictly greater than `threshold`.
pub fn first_exceedance(values: ArrayView1<'_, f64>, threshold: f64) -> Option<usize> {
    values.iter().position(|&v| v > threshold)
}

/// All channels interpolated to the yield point of one segment.
///
/// Fields
/// ------
/// - `values`: one interpolated value per channel of the series.
/// - `lower`, `upper`: bracketing sample indices (`upper = lower + 1`).
/// - `fraction`: interpolation weight of `upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldPoint {
    pub values: BTreeMap<String, f64>,
    pub lower: usize,
    pub upper: usize,
    pub fraction: f64,
}

impl YieldPoint {
    /// Interpolated value of one channel.
    ///
    /// # Errors
    /// - `MechanicsError::Data(DataError::MissingChannel)` for unknown names.
    pub fn value(&self, name: &str) -> MechanicsResult<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| DataError::MissingChannel { name: name.to_string() }.into())
    }
}

/// Yield point of the segment `[start, end)` for a known compliance.
///
/// Parameters
/// ----------
/// - `series`: `&TimeSeries` with `sig`, `eps`, `tau` and `gam`.
/// - `start`, `end`: half-open segment window.
/// - `compliance`: elastic compliance used to remove elastic strain.
/// - `offset`: effective plastic strain change defining yield (> 0).
/// - `dvm_ep0`: von Mises stress change after which plastic strain is
///   referenced to zero; `-1.0` uses the first sample.
///
/// Returns
/// -------
/// `MechanicsResult<YieldPoint>`
///
/// Errors
/// ------
/// - `MechanicsError::InvalidOffset` for a non-positive offset.
/// - `MechanicsError::EmptyWindow` / `MechanicsError::WindowOutOfRange`.
/// - `MechanicsError::ThresholdNotReached` if the stress change never
///   exceeds `dvm_ep0` or the plastic strain never exceeds `offset`.
/// - `MechanicsError::Data` for missing channels.
pub fn yield_point(
    series: &TimeSeries, start: usize, end: usize, compliance: &ComplianceVector, offset: f64,
    dvm_ep0: f64,
) -> MechanicsResult<YieldPoint> {
    if !offset.is_finite() || offset <= 0.0 {
        return Err(MechanicsError::InvalidOffset { value: offset });
    }
    check_window(series, start, end)?;
    let dvm = stress_change(series, start, end)?;
    let i_zero = first_exceedance(dvm.view(), dvm_ep0).ok_or(
        MechanicsError::ThresholdNotReached {
            quantity: "von Mises stress change",
            threshold: dvm_ep0,
            start,
            end,
        },
    )?;

    let (eps_el, gam_el) = compliance.elastic_strain(series, start, end)?;
    let eps_pl = &series.channel(EPS)?.slice(s![start..end]) - &eps_el;
    let gam_pl = &series.channel(GAM)?.slice(s![start..end]) - &gam_el;
    let deps_pl = &eps_pl - eps_pl[i_zero];
    let dgam_pl = &gam_pl - gam_pl[i_zero];
    let evm = effective_strain_array(deps_pl.view(), dgam_pl.view())?;

    // evm[i_zero] == 0 < offset, so the crossing has a predecessor.
    let i_above = first_exceedance(evm.slice(s![i_zero..]), offset)
        .map(|i| i + i_zero)
        .filter(|&i| i > 0)
        .ok_or(MechanicsError::ThresholdNotReached {
            quantity: "effective plastic strain",
            threshold: offset,
            start,
            end,
        })?;

    let fraction = (offset - evm[i_above - 1]) / (evm[i_above] - evm[i_above - 1]);
    let upper = start + i_above;
    let lower = upper - 1;
    let values = series.interpolate(lower, upper, fraction)?;
    Ok(YieldPoint { values, lower, upper, fraction })
}

/// Elastic parameters and yield points per segment type.
///
/// Each field holds K arrays (K = number of boundary groups); array `k` has
/// one entry per segment starting at a group-`k` boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldInfo {
    pub emod: Vec<Array1<f64>>,
    pub gmod: Vec<Array1<f64>>,
    pub eps: Vec<Array1<f64>>,
    pub sig: Vec<Array1<f64>>,
    pub gam: Vec<Array1<f64>>,
    pub tau: Vec<Array1<f64>>,
    pub time: Vec<Array1<f64>>,
}

impl YieldInfo {
    /// Field names accepted by [`YieldInfo::get`].
    pub const KEYS: [&'static str; 7] = ["Emod", "Gmod", "eps", "sig", "gam", "tau", "time"];

    pub fn get(&self, key: &str) -> Option<&[Array1<f64>]> {
        let field = match key {
            "Emod" => &self.emod,
            "Gmod" => &self.gmod,
            "eps" => &self.eps,
            "sig" => &self.sig,
            "gam" => &self.gam,
            "tau" => &self.tau,
            "time" => &self.time,
            _ => return None,
        };
        Some(field.as_slice())
    }

    /// Number of segment types (K).
    pub fn num_segment_types(&self) -> usize {
        self.emod.len()
    }
}

/// Yield points and moduli of every segment.
///
/// Parameters
/// ----------
/// - `series`: `&TimeSeries` with `time`, `sig`, `eps`, `tau` and `gam`.
/// - `groups`: boundary groups; segments are formed by
///   [`SegmentBoundaryGroups::segments`].
/// - `opts`: `&YieldOptions`.
///
/// Returns
/// -------
/// `MechanicsResult<YieldInfo>`
///
/// Errors
/// ------
/// - Option errors from [`YieldOptions::validate`].
/// - `MechanicsError::ThresholdNotReached` if a segment never leaves the
///   elastic window or never reaches the yield offset.
/// - `MechanicsError::EmptyWindow` if the elastic window of a segment is
///   empty.
/// - Errors of [`solve`] and [`yield_point`].
pub fn find_yield(
    series: &TimeSeries, groups: &SegmentBoundaryGroups, opts: &YieldOptions,
) -> MechanicsResult<YieldInfo> {
    opts.validate()?;
    let compliance_opts = opts.compliance_options();
    let k = groups.num_groups();
    let mut info = YieldInfo {
        emod: Vec::with_capacity(k),
        gmod: Vec::with_capacity(k),
        eps: Vec::with_capacity(k),
        sig: Vec::with_capacity(k),
        gam: Vec::with_capacity(k),
        tau: Vec::with_capacity(k),
        time: Vec::with_capacity(k),
    };

    for (seg_type, segments) in groups.segments().iter().enumerate() {
        let n = segments.len();
        let mut columns: [Vec<f64>; 7] = std::array::from_fn(|_| Vec::with_capacity(n));
        for segment in segments {
            let (compliance, yp) = analyse_segment(series, *segment, opts, &compliance_opts)?;
            columns[0].push(if opts.axial { compliance.axial_modulus() } else { f64::NAN });
            columns[1].push(if opts.shear { compliance.shear_modulus() } else { f64::NAN });
            for (column, name) in columns[2..].iter_mut().zip([EPS, SIG, GAM, TAU, TIME]) {
                column.push(yp.value(name)?);
            }
        }
        debug!(seg_type, segments = n, "yield points identified");

        let [emod, gmod, eps, sig, gam, tau, time] = columns.map(Array1::from);
        info.emod.push(emod);
        info.gmod.push(gmod);
        info.eps.push(eps);
        info.sig.push(sig);
        info.gam.push(gam);
        info.tau.push(tau);
        info.time.push(time);
    }
    Ok(info)
}

fn analyse_segment(
    series: &TimeSeries, segment: Segment, opts: &YieldOptions,
    compliance_opts: &ComplianceOptions,
) -> MechanicsResult<(ComplianceVector, YieldPoint)> {
    let Segment { start, end } = segment;
    check_window(series, start, end)?;
    let dvm = stress_change(series, start, end)?;
    let (dvm_min, dvm_max) = opts.delta_vm;
    let not_reached = |threshold| MechanicsError::ThresholdNotReached {
        quantity: "von Mises stress change",
        threshold,
        start,
        end,
    };
    let el_start = first_exceedance(dvm.view(), dvm_min).ok_or_else(|| not_reached(dvm_min))?;
    let el_end = first_exceedance(dvm.view(), dvm_max).ok_or_else(|| not_reached(dvm_max))?;

    let compliance = solve(series, start + el_start, start + el_end, compliance_opts)?;
    let yp = yield_point(series, start, end, &compliance, opts.offset, dvm_min)?;
    Ok((compliance, yp))
}

/// von Mises stress change relative to the first sample of `[start, end)`.
fn stress_change(series: &TimeSeries, start: usize, end: usize) -> MechanicsResult<Array1<f64>> {
    let sig = series.channel(SIG)?.slice(s![start..end]);
    let tau = series.channel(TAU)?.slice(s![start..end]);
    let dsig = &sig - sig[0];
    let dtau = &tau - tau[0];
    effective_stress_array(dsig.view(), dtau.view())
}
