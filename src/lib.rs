//! rust_cyclic — cyclic mechanical-test analysis with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the cyclic-data routines to Python via the `_rust_cyclic` extension module.
//! The crate turns axial-torsional test records into segment boundaries,
//! smoothed channels, refined cycle times, elastic parameters and yield
//! points.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`data`, `cycle`, `smoothing`,
//!   `optimization`, `mechanics`, `numerics`) as the public crate surface.
//! - Define `#[pyfunction]`s, a `#[pyclass]` result wrapper and the
//!   `#[pymodule]` initializer for the `_rust_cyclic` extension.
//! - Create and register Python submodules (`cycle`, `smoothing`,
//!   `mechanics`) under `rust_cyclic` so that dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input conversion and error mapping.
//! - Test data crosses the boundary as `dict[str, array-like]` with at least
//!   the channels an operation needs (`time`, `sig`, `eps`, `tau`, `gam`,
//!   `stp`).
//!
//! Conventions
//! -----------
//! - Boundary groups cross the boundary as `list[list[int]]`; per-segment-type
//!   results as `list[numpy.ndarray]`.
//! - Errors from core Rust code are converted into Python `ValueError`s via
//!   the `From<...> for PyErr` impls of each error enum.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on the inner modules and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_cyclic` and wraps it in
//!   user-facing functions.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod cycle;
pub mod data;
pub mod error_kind;
pub mod mechanics;
pub mod numerics;
pub mod optimization;
pub mod smoothing;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    cycle::{
        aggregate::{SegmentValues, diff_values, mid_values},
        detect::{DetectOptions, detect, detect_by_strain_change},
    },
    data::{selection::ChannelSelection, series::TimeSeries},
    mechanics::{
        compliance::{ComplianceOptions, solve},
        von_mises::{effective_strain_array, effective_stress_array, polar_angle},
        yield_point::{YieldInfo, YieldOptions, find_yield},
    },
    optimization::{
        options::CycleTimeOptions,
        run::{CycleTimeOutcome, run_cycle_time_search},
    },
    smoothing::{
        global::{GlobalBasis, GlobalSmoother, KnotPlacement},
        local::{FilterSpec, LocalSmoother},
    },
    utils::{
        arrays_to_list, extract_array1, extract_filter, extract_groups, extract_selection,
        extract_series, series_to_dict,
    },
};

// ---- cycle ----

/// Segment boundary groups from a step counter.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (stp, num_per_cycle = 2, num_skip = 0, tol = 1e-6))]
fn detect_segments<'py>(
    py: Python<'py>, stp: &Bound<'py, PyAny>, num_per_cycle: usize, num_skip: usize, tol: f64,
) -> PyResult<Vec<Vec<usize>>> {
    let stp = extract_array1(py, stp)?;
    let opts = DetectOptions::new(num_per_cycle, num_skip, tol)?;
    Ok(detect(stp.view(), &opts)?.groups().to_vec())
}

/// Segment boundary groups from the von Mises strain change between steps.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "detect_by_strain_change", signature = (data, min_change, num_per_cycle = 2))]
fn py_detect_by_strain_change<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, min_change: f64, num_per_cycle: usize,
) -> PyResult<Vec<Vec<usize>>> {
    let series = extract_series(py, data)?;
    Ok(detect_by_strain_change(&series, min_change, num_per_cycle)?.groups().to_vec())
}

#[cfg(feature = "python-bindings")]
fn segment_values_to_dict<'py>(
    py: Python<'py>, values: &SegmentValues,
) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new(py);
    for (name, per_type) in values {
        out.set_item(name, arrays_to_list(py, per_type)?)?;
    }
    Ok(out)
}

/// Segment midpoints `(x[start] + x[end]) / 2` per channel and segment type.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "mid_values")]
fn py_mid_values<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, groups: &Bound<'py, PyAny>, channels: Vec<String>,
) -> PyResult<Bound<'py, PyDict>> {
    let series = extract_series(py, data)?;
    let groups = extract_groups(groups)?;
    segment_values_to_dict(py, &mid_values(&series, &channels, &groups)?)
}

/// Segment ranges `x[end] - x[start]` per channel and segment type.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "diff_values")]
fn py_diff_values<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, groups: &Bound<'py, PyAny>, channels: Vec<String>,
) -> PyResult<Bound<'py, PyDict>> {
    let series = extract_series(py, data)?;
    let groups = extract_groups(groups)?;
    segment_values_to_dict(py, &diff_values(&series, &channels, &groups)?)
}

// ---- smoothing ----

/// Local smoothing between segment boundaries with one filter for all
/// selected channels.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (data, groups, filter = "polynomial", degree = None, knots = None, channels = None))]
fn smooth_data<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, groups: &Bound<'py, PyAny>, filter: &str,
    degree: Option<usize>, knots: Option<&Bound<'py, PyAny>>, channels: Option<Vec<String>>,
) -> PyResult<Bound<'py, PyDict>> {
    let series = extract_series(py, data)?;
    let groups = extract_groups(groups)?;
    let filter = extract_filter(filter, degree, knots)?;
    let mut smoother = LocalSmoother::new(FilterSpec::Uniform(filter));
    if let Some(selection) = extract_selection(channels) {
        smoother = smoother.with_channels(selection);
    }
    series_to_dict(py, &smoother.smooth(&series, &groups)?)
}

#[cfg(feature = "python-bindings")]
fn global_basis(num_knots: usize, knot_order: usize, cycle_order: usize) -> PyResult<GlobalBasis> {
    Ok(GlobalBasis::new(KnotPlacement::Count(num_knots), knot_order, cycle_order)?)
}

/// Global piecewise-polynomial smoothing over the whole test.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    data, cycle_times, num_knots = 10, knot_order = 3, cycle_order = 0, max_index = None,
    channels = None
))]
fn smooth_global<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, cycle_times: &Bound<'py, PyAny>,
    num_knots: usize, knot_order: usize, cycle_order: usize, max_index: Option<usize>,
    channels: Option<Vec<String>>,
) -> PyResult<Bound<'py, PyDict>> {
    let series = extract_series(py, data)?;
    let cycle_times = extract_array1(py, cycle_times)?;
    let mut smoother = GlobalSmoother::new(global_basis(num_knots, knot_order, cycle_order)?)
        .with_max_index(max_index);
    if let Some(selection) = extract_selection(channels) {
        smoother = smoother.with_channels(selection);
    }
    series_to_dict(py, &smoother.smooth(&series, cycle_times.as_slice().unwrap_or(&[]))?)
}

/// CycleTimeResult — outcome of a cycle-time search exposed to Python.
///
/// Purpose
/// -------
/// Present the refined cycle times and the search diagnostics of
/// [`CycleTimeOutcome`] as read-only Python properties.
///
/// Fields
/// ------
/// - `inner`: [`CycleTimeOutcome`]
///   Full search result.
///
/// Notes
/// -----
/// - Rust callers should use [`CycleTimeOutcome`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_cyclic.smoothing")]
pub struct CycleTimeResult {
    pub inner: CycleTimeOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl CycleTimeResult {
    #[getter]
    pub fn cycle_times<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.cycle_times.clone().into_pyarray(py)
    }

    #[getter]
    pub fn error(&self) -> f64 {
        self.inner.error
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }
}

/// Refine cycle times so that the global smoothing residual is minimal.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    data, cycle_times, channels, dt_max = 0.1, max_iter = 100, num_knots = 0, knot_order = 1,
    cycle_order = 1, max_index = None, fix_endpoints = false, verbose = false
))]
fn optimize_cycle_times<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, cycle_times: &Bound<'py, PyAny>,
    channels: Vec<String>, dt_max: f64, max_iter: usize, num_knots: usize, knot_order: usize,
    cycle_order: usize, max_index: Option<usize>, fix_endpoints: bool, verbose: bool,
) -> PyResult<CycleTimeResult> {
    let series = extract_series(py, data)?;
    let initial = extract_array1(py, cycle_times)?;
    let opts = CycleTimeOptions::new(
        dt_max,
        max_iter,
        global_basis(num_knots, knot_order, cycle_order)?,
        max_index,
        fix_endpoints,
        verbose,
    )?;
    let outcome = run_cycle_time_search(
        &series,
        initial.as_slice().unwrap_or(&[]),
        &ChannelSelection::Only(channels),
        &opts,
    )?;
    Ok(CycleTimeResult { inner: outcome })
}

// ---- mechanics ----

/// Von Mises effective stress `sqrt(sig² + 3 tau²)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn effective_stress<'py>(
    py: Python<'py>, sig: &Bound<'py, PyAny>, tau: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let (sig, tau) = (extract_array1(py, sig)?, extract_array1(py, tau)?);
    Ok(effective_stress_array(sig.view(), tau.view())?.into_pyarray(py))
}

/// Von Mises effective strain `sqrt(eps² + gam² / 3)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn effective_strain<'py>(
    py: Python<'py>, eps: &Bound<'py, PyAny>, gam: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let (eps, gam) = (extract_array1(py, eps)?, extract_array1(py, gam)?);
    Ok(effective_strain_array(eps.view(), gam.view())?.into_pyarray(py))
}

/// Angle in the `sig`-`sqrt(3) tau` plane, continuous around the mean point.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(name = "polar_angle")]
fn py_polar_angle<'py>(
    py: Python<'py>, sig: &Bound<'py, PyAny>, tau: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let (sig, tau) = (extract_array1(py, sig)?, extract_array1(py, tau)?);
    Ok(polar_angle(sig.view(), tau.view())?.into_pyarray(py))
}

/// Compliance vector `[e0, g0, Cs, Ct(, Cst)]` fitted on `[start, end)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (data, start, end, anisotropic = false, axial = true, shear = true))]
fn compliance<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, start: usize, end: usize, anisotropic: bool,
    axial: bool, shear: bool,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let series: TimeSeries = extract_series(py, data)?;
    let opts = ComplianceOptions::new(anisotropic, axial, shear)?;
    Ok(solve(&series, start, end, &opts)?.to_array().into_pyarray(py))
}

/// Elastic moduli and yield points of every segment.
///
/// Returns a dict with keys `Emod`, `Gmod`, `eps`, `sig`, `gam`, `tau` and
/// `time`; each value is a list with one array per segment type.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (
    data, groups, yield_offset = 0.001, delta_vm = (-1.0, 200.0), axial = true, shear = true,
    anisotropic = false
))]
fn get_yield<'py>(
    py: Python<'py>, data: &Bound<'py, PyDict>, groups: &Bound<'py, PyAny>, yield_offset: f64,
    delta_vm: (f64, f64), axial: bool, shear: bool, anisotropic: bool,
) -> PyResult<Bound<'py, PyDict>> {
    let series = extract_series(py, data)?;
    let groups = extract_groups(groups)?;
    let opts = YieldOptions::new(yield_offset, delta_vm, axial, shear, anisotropic)?;
    let info = find_yield(&series, &groups, &opts)?;

    let out = PyDict::new(py);
    for key in YieldInfo::KEYS {
        if let Some(arrays) = info.get(key) {
            out.set_item(key, arrays_to_list(py, arrays)?)?;
        }
    }
    Ok(out)
}

/// _rust_cyclic — PyO3 module initializer for the Python extension.
///
/// Purpose
/// -------
/// Define the `_rust_cyclic` Python module and register the `cycle`,
/// `smoothing` and `mechanics` submodules used by the public `rust_cyclic`
/// package.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating submodules or manipulating `sys.modules` fails.
///
/// Notes
/// -----
/// - Invoked by Python when importing the compiled extension.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_cyclic<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let cycle_mod = PyModule::new(_py, "cycle")?;
    let smoothing_mod = PyModule::new(_py, "smoothing")?;
    let mechanics_mod = PyModule::new(_py, "mechanics")?;
    cycle(_py, m, &cycle_mod)?;
    smoothing(_py, m, &smoothing_mod)?;
    mechanics(_py, m, &mechanics_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    let modules = _py.import("sys")?.getattr("modules")?;
    modules.set_item("rust_cyclic.cycle", cycle_mod)?;
    modules.set_item("rust_cyclic.smoothing", smoothing_mod)?;
    modules.set_item("rust_cyclic.mechanics", mechanics_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn cycle<'py>(
    _py: Python, rust_cyclic: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(detect_segments, m)?)?;
    m.add_function(wrap_pyfunction!(py_detect_by_strain_change, m)?)?;
    m.add_function(wrap_pyfunction!(py_mid_values, m)?)?;
    m.add_function(wrap_pyfunction!(py_diff_values, m)?)?;
    rust_cyclic.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn smoothing<'py>(
    _py: Python, rust_cyclic: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(smooth_data, m)?)?;
    m.add_function(wrap_pyfunction!(smooth_global, m)?)?;
    m.add_function(wrap_pyfunction!(optimize_cycle_times, m)?)?;
    m.add_class::<CycleTimeResult>()?;
    rust_cyclic.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn mechanics<'py>(
    _py: Python, rust_cyclic: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(effective_stress, m)?)?;
    m.add_function(wrap_pyfunction!(effective_strain, m)?)?;
    m.add_function(wrap_pyfunction!(py_polar_angle, m)?)?;
    m.add_function(wrap_pyfunction!(compliance, m)?)?;
    m.add_function(wrap_pyfunction!(get_yield, m)?)?;
    rust_cyclic.add_submodule(m)?;
    Ok(())
}
