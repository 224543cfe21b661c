//! Integration tests for the cyclic-data pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from raw machine channels, through segment
//!   detection and smoothing, to refined cycle times and yield points.
//! - Exercise the public crate surface only, the way a downstream user would.
//!
//! Coverage
//! --------
//! - `data`: specimen conversion of raw channels into a `TimeSeries`.
//! - `cycle`: step-counter detection, strain-change detection and segment
//!   aggregation.
//! - `smoothing`: local segment fits and the global piecewise basis.
//! - `optimization`: cycle-time recovery from perturbed starting times.
//! - `mechanics`: moduli and yield stresses of ideal-plasticity data.
//!
//! Exclusions
//! ----------
//! - Option validation and error variants of individual modules, covered by
//!   unit tests.
//! - Python bindings.
use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{Array1, array};
use rust_cyclic::{
    cycle::{
        aggregate::{diff_values, mid_values},
        detect::{DetectOptions, detect, detect_by_strain_change},
        groups::SegmentBoundaryGroups,
    },
    data::{
        selection::ChannelSelection,
        series::{EPS, GAM, SIG, STP, TAU, TIME, TimeSeries},
        specimen::{RawChannels, SpecimenGeometry},
    },
    mechanics::{
        von_mises::effective_stress,
        yield_point::{YieldInfo, YieldOptions, find_yield},
    },
    numerics::polynomial::macaulay,
    optimization::{options::CycleTimeOptions, run::run_cycle_time_search},
    smoothing::{
        filters::LocalFilter,
        global::{GlobalBasis, GlobalSmoother, KnotPlacement},
        local::{FilterSpec, LocalSmoother},
    },
};

// ---- Segment detection and aggregation ----

#[test]
// Purpose
// -------
// A step counter with sub-tolerance plateaus and irregular jumps yields
// every strict increase as a boundary.
//
// Given
// -----
// - stp = [0, 1, 1, 1, 2, 2, 2.1, 2.1, 2.1, 2.3, 10, 12, 12, 14], K = 1.
//
// Expect
// ------
// - One group [0, 1, 4, 6, 9, 10, 11, 13] (index 0 seeds the first segment).
// - With K = 2 the groups interleave and their sorted union is unchanged.
fn step_counter_boundaries() {
    // Arrange
    let stp = array![0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.1, 2.1, 2.1, 2.3, 10.0, 12.0, 12.0, 14.0];

    // Act
    let single = detect(stp.view(), &DetectOptions::new(1, 0, 1e-6).unwrap()).unwrap();
    let paired = detect(stp.view(), &DetectOptions::new(2, 0, 1e-6).unwrap()).unwrap();

    // Assert
    assert_eq!(single.groups(), &[vec![0, 1, 4, 6, 9, 10, 11, 13]]);
    assert_eq!(paired.groups(), &[vec![0, 4, 9, 11], vec![1, 6, 10, 13]]);
    let mut union = paired.flattened();
    union.sort_unstable();
    assert_eq!(union, single.flattened());
}

#[test]
// Purpose
// -------
// Segment midpoints and ranges pair each boundary with the next one.
//
// Given
// -----
// - x = 1..=10 and groups [[1, 4, 9], [2, 7]].
//
// Expect
// ------
// - Midpoints [[2.5, 6.5], [4.0, 9.0]] and ranges [[1, 3], [2, 2]].
fn segment_mid_and_diff_values() {
    let series = TimeSeries::from_pairs([("x", Array1::linspace(1.0, 10.0, 10))]).unwrap();
    let groups = SegmentBoundaryGroups::new(vec![vec![1, 4, 9], vec![2, 7]]).unwrap();

    let mid = mid_values(&series, &["x"], &groups).unwrap();
    let diff = diff_values(&series, &["x"], &groups).unwrap();

    assert_eq!(mid["x"], vec![array![2.5, 6.5], array![4.0, 9.0]]);
    assert_eq!(diff["x"], vec![array![1.0, 3.0], array![2.0, 2.0]]);
}

// ---- Smoothing ----

const KINKS: [f64; 5] = [0.0, 2.0, 4.5, 7.0, 10.0];
const SLOPES: [f64; 4] = [1.0, -2.0, 1.5, -0.5];

/// Piecewise linear channel with kinks at `KINKS` on 1001 samples and a step
/// counter that increments at every kink.
fn kinked_series() -> TimeSeries {
    let time: Array1<f64> = Array1::linspace(0.0, 10.0, 1001);
    let lin = time.mapv(|t| {
        0.3 + KINKS.iter().zip(SLOPES.iter()).map(|(k, p)| p * macaulay(t - k)).sum::<f64>()
    });
    let stp = time.mapv(|t| KINKS[1..].iter().filter(|&&k| t >= k - 1e-9).count() as f64);
    let noisy = &lin + &time.mapv(|t| 0.05 * (37.0 * t).sin());
    TimeSeries::from_pairs([(TIME, time), ("lin", lin), ("noisy", noisy), (STP, stp)]).unwrap()
}

#[test]
// Purpose
// -------
// Local linear fits between step-counter boundaries reproduce a piecewise
// linear channel whose kinks sit on the boundaries, while a noisy channel
// is actually smoothed.
fn local_linear_fits_follow_step_boundaries() {
    // Arrange
    let series = kinked_series();
    let groups = detect(series.channel(STP).unwrap().view(), &DetectOptions::default()).unwrap();
    let smoother = LocalSmoother::new(FilterSpec::Uniform(LocalFilter::polynomial(1)));

    // Act
    let smoothed = smoother.smooth(&series, &groups).unwrap();

    // Assert
    assert_eq!(groups.flattened().len(), 5);
    let lin = series.channel("lin").unwrap();
    for (a, b) in smoothed.channel("lin").unwrap().iter().zip(lin.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }
    let residual: f64 = smoothed
        .channel("noisy")
        .unwrap()
        .iter()
        .zip(lin.iter())
        .map(|(a, b)| (a - b).abs())
        .sum::<f64>()
        / lin.len() as f64;
    assert!(residual < 0.01, "mean deviation from the clean signal: {residual}");
    assert_eq!(smoothed.channel(STP).unwrap(), series.channel(STP).unwrap());
}

#[test]
// Purpose
// -------
// The global continuous piecewise linear basis reproduces the kinked
// channel exactly when the cycle times sit on the kinks.
fn global_linear_basis_is_exact_on_true_cycle_times() {
    let series = kinked_series();
    let basis = GlobalBasis::new(KnotPlacement::Count(0), 1, 1).unwrap();
    let smoother = GlobalSmoother::new(basis).with_channels(ChannelSelection::only(["lin"]));

    let smoothed = smoother.smooth(&series, &KINKS).unwrap();

    for (a, b) in smoothed.channel("lin").unwrap().iter().zip(series.channel("lin").unwrap()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
// Purpose
// -------
// Perturbed cycle times are pulled back onto the kinks of the data.
//
// Given
// -----
// - Interior cycle times perturbed by (−0.008, +0.007, −0.003).
//
// - Endpoints pinned, since the data starts and ends on them.
//
// Expect
// ------
// - Converged search with every time within 1e-3 of its kink and fixed
//   endpoints.
fn cycle_times_are_recovered() {
    // Arrange
    let series = kinked_series();
    let initial = [KINKS[0], KINKS[1] - 0.008, KINKS[2] + 0.007, KINKS[3] - 0.003, KINKS[4]];
    let opts = CycleTimeOptions { fix_endpoints: true, ..CycleTimeOptions::default() };

    // Act
    let outcome =
        run_cycle_time_search(&series, &initial, &ChannelSelection::only(["lin"]), &opts).unwrap();

    // Assert
    assert!(outcome.converged, "status: {}", outcome.status);
    for (found, kink) in outcome.cycle_times.iter().zip(KINKS.iter()) {
        assert_abs_diff_eq!(*found, *kink, epsilon = 1e-3);
    }
    assert_eq!(outcome.cycle_times[0], KINKS[0]);
    assert_eq!(outcome.cycle_times[4], KINKS[4]);
}

// ---- Yield points from raw channels ----

const E: f64 = 210e3;
const SIG_Y: f64 = 200.0;
const PER_CYCLE: usize = 100;
const NUM_CYCLES: usize = 10;
const AMP: f64 = 0.004;

fn noise(i: usize, a: usize, b: usize) -> f64 {
    ((i * a + b) % 1000) as f64 / 500.0 - 1.0
}

/// Ideal-plasticity response to a strain sawtooth, recorded as raw machine
/// channels of a tube specimen.
fn raw_sawtooth(geometry: &SpecimenGeometry) -> RawChannels {
    let n = NUM_CYCLES * PER_CYCLE + 1;
    let eps: Array1<f64> = (0..n)
        .map(|i| {
            if i <= PER_CYCLE {
                return AMP * i as f64 / PER_CYCLE as f64;
            }
            let m = (i - 1) / PER_CYCLE;
            let k = (i - m * PER_CYCLE) as f64 / PER_CYCLE as f64;
            let sign = if m % 2 == 1 { -1.0 } else { 1.0 };
            sign * (2.0 * AMP * k - AMP)
        })
        .collect();
    let mut eps_p = 0.0;
    let sig: Array1<f64> = eps
        .iter()
        .map(|&e| {
            let trial = E * (e - eps_p);
            if trial.abs() > SIG_Y {
                eps_p = e - SIG_Y * trial.signum() / E;
                SIG_Y * trial.signum()
            } else {
                trial
            }
        })
        .collect();
    let tau: Array1<f64> = (0..n).map(|i| noise(i, 104_729, 7)).collect();
    let gam: Array1<f64> = (0..n).map(|i| 1e-5 * noise(i, 7919, 13)).collect();

    let area = geometry.area();
    let rm = geometry.mean_radius();
    RawChannels {
        time: Array1::linspace(0.0, NUM_CYCLES as f64, n),
        force: &sig * area,
        axial_strain: eps,
        axial_count: (0..n).map(|i| (i / PER_CYCLE) as f64).collect(),
        torque: &tau * (area * rm),
        rotation: &gam * (geometry.gauge_length() / rm),
        torsional_count: Array1::zeros(n),
    }
}

#[test]
// Purpose
// -------
// Full pipeline on ideal-plasticity data: raw channels → stresses and
// strains → step-counter segments → moduli and yield points.
//
// Given
// -----
// - Tube with inner/outer diameter 20/24 and gauge length 18.
// - 10 strain cycles ±0.4 %, E = 210 GPa, σy = 200 MPa, tiny shear noise.
// - Offset 1e-4 and elastic window (−1, 190).
//
// Expect
// ------
// - Two segment types of 5 segments each.
// - Emod ≈ E everywhere; |σ| ≈ σy and von Mises stress ≈ σy at yield.
// - Strain-change detection with a threshold below the cycle amplitude
//   finds the same boundaries as the step counter.
fn yield_points_from_raw_channels() {
    // Arrange
    let geometry = SpecimenGeometry::new(20.0, 24.0, 18.0).unwrap();
    let series = raw_sawtooth(&geometry).to_series(&geometry).unwrap();
    let groups = detect(series.channel(STP).unwrap().view(), &DetectOptions::default()).unwrap();
    let opts = YieldOptions::new(1e-4, (-1.0, 190.0), true, true, false).unwrap();

    // Act
    let info: YieldInfo = find_yield(&series, &groups, &opts).unwrap();
    let by_strain = detect_by_strain_change(&series, 0.002, 2).unwrap();

    // Assert
    assert_eq!(groups.groups()[0], vec![0, 200, 400, 600, 800, 1000]);
    assert_eq!(by_strain, groups);
    assert_relative_eq!(series.channel(SIG).unwrap()[50], SIG_Y, max_relative = 1e-9);
    for k in 0..2 {
        assert_eq!(info.emod[k].len(), 5);
        for j in 0..5 {
            assert_relative_eq!(info.emod[k][j], E, max_relative = 1e-6);
            assert_relative_eq!(info.sig[k][j].abs(), SIG_Y, max_relative = 1e-6);
            let vm = effective_stress(info.sig[k][j], info.tau[k][j]);
            assert_relative_eq!(vm, SIG_Y, max_relative = 1e-4);
            assert!(info.time[k][j] > (2 * j + k) as f64);
            assert!(info.eps[k][j].abs() <= AMP);
            assert!(info.gam[k][j].abs() <= 1e-5);
        }
    }
    assert!(series.contains(EPS) && series.contains(GAM) && series.contains(TAU));
}
