//! Python bindings for spectral analysis

use super::as_slice;
use crate::audio::AudioBuffer;
use crate::spectrum;
use num_complex::Complex64;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

/// One-sided spectrum of a signal
///
/// Returns:
///     Tuple of (frequencies in Hz, complex bin values)
#[pyfunction]
pub fn transform<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: u32,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>)> {
    let buffer = AudioBuffer::new(sample_rate, as_slice(&signal)?.to_vec())?;
    let result = py.allow_threads(|| spectrum::transform(&buffer))?;
    Ok((
        PyArray1::from_vec(py, result.frequencies),
        PyArray1::from_vec(py, result.values),
    ))
}

/// Remove the band [low_hz, high_hz] in the frequency domain
#[pyfunction]
pub fn notch_remove<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: u32,
    low_hz: f64,
    high_hz: f64,
) -> PyResult<&'py PyArray1<f64>> {
    let buffer = AudioBuffer::new(sample_rate, as_slice(&signal)?.to_vec())?;
    let output = py.allow_threads(|| spectrum::notch_remove(&buffer, low_hz, high_hz))?;
    Ok(PyArray1::from_vec(py, output.into_samples()))
}
