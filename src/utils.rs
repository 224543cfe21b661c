//! Conversion helpers between Python objects and crate types.
//!
//! Everything here is FFI glue for the `python-bindings` feature: arrays
//! and dicts of arrays in, `TimeSeries` and options out.
#[cfg(feature = "python-bindings")]
use std::collections::BTreeMap;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict, PyList},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Array1 → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
use crate::{
    cycle::groups::SegmentBoundaryGroups,
    data::{selection::ChannelSelection, series::TimeSeries},
    smoothing::filters::{KnotCount, LocalFilter},
};

/// Borrow or copy a 1-D float64 array from numpy, pandas or a sequence.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned copy of a 1-D float64 array-like.
#[cfg(feature = "python-bindings")]
pub fn extract_array1<'py>(py: Python<'py>, raw_data: &Bound<'py, PyAny>) -> PyResult<Array1<f64>> {
    Ok(extract_f64_array(py, raw_data)?.as_array().to_owned())
}

/// Build a [`TimeSeries`] from a `dict[str, array-like]`.
///
/// Errors
/// ------
/// - `TypeError` for non-string keys or non-numeric values.
/// - `ValueError` for ragged, non-finite or non-monotonic channels.
#[cfg(feature = "python-bindings")]
pub fn extract_series<'py>(py: Python<'py>, data: &Bound<'py, PyDict>) -> PyResult<TimeSeries> {
    let mut channels = BTreeMap::new();
    for (key, value) in data.iter() {
        let name: String = key
            .extract()
            .map_err(|_| PyTypeError::new_err("channel names must be strings"))?;
        channels.insert(name, extract_array1(py, &value)?);
    }
    Ok(TimeSeries::new(channels)?)
}

/// `dict[str, numpy.ndarray]` with one entry per channel.
#[cfg(feature = "python-bindings")]
pub fn series_to_dict<'py>(py: Python<'py>, series: &TimeSeries) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new(py);
    for (name, values) in series.iter() {
        out.set_item(name, values.clone().into_pyarray(py))?;
    }
    Ok(out)
}

/// `list[numpy.ndarray]`, one array per segment type.
#[cfg(feature = "python-bindings")]
pub fn arrays_to_list<'py>(py: Python<'py>, arrays: &[Array1<f64>]) -> PyResult<Bound<'py, PyList>> {
    PyList::new(py, arrays.iter().map(|a| a.clone().into_pyarray(py)))
}

/// Boundary groups from a sequence of integer sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_groups(raw: &Bound<'_, PyAny>) -> PyResult<SegmentBoundaryGroups> {
    let groups: Vec<Vec<usize>> = raw.extract().map_err(|_| {
        PyTypeError::new_err("boundary groups must be a sequence of sequences of non-negative ints")
    })?;
    Ok(SegmentBoundaryGroups::new(groups)?)
}

/// `None` keeps the default selection; a list selects exactly those names.
#[cfg(feature = "python-bindings")]
pub fn extract_selection(channels: Option<Vec<String>>) -> Option<ChannelSelection> {
    channels.map(ChannelSelection::Only)
}

/// Knot count from an int (count) or a float in `(0, 1]` (fraction).
#[cfg(feature = "python-bindings")]
fn extract_knots(raw: Option<&Bound<'_, PyAny>>) -> PyResult<KnotCount> {
    let Some(raw) = raw else {
        return Ok(KnotCount::default());
    };
    if let Ok(count) = raw.extract::<usize>() {
        return Ok(KnotCount::Count(count));
    }
    let fraction: f64 = raw
        .extract()
        .map_err(|_| PyTypeError::new_err("knots must be an int count or a float fraction"))?;
    Ok(KnotCount::Fraction(fraction))
}

/// Local filter from its Python name and parameters.
#[cfg(feature = "python-bindings")]
pub fn extract_filter(
    name: &str, degree: Option<usize>, knots: Option<&Bound<'_, PyAny>>,
) -> PyResult<LocalFilter> {
    let knots = extract_knots(knots)?;
    let filter = match name {
        "polynomial" => LocalFilter::polynomial(degree.unwrap_or(1)),
        "linear_segments" => LocalFilter::linear_segments(knots),
        "cubic_spline" => LocalFilter::cubic_spline(knots),
        "spline" => LocalFilter::Spline { degree: degree.unwrap_or(3), knots },
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid filter {other:?} (expected 'polynomial', 'linear_segments', \
                 'cubic_spline', or 'spline')"
            )));
        }
    };
    Ok(filter)
}
