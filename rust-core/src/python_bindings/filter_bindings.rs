//! Python bindings for filter design and application

use super::as_slice;
use crate::audio::AudioBuffer;
use crate::filters::{self, BandType, FilterCoefficients, FilterFamily, FilterSpec};
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

/// Design a filter
///
/// Args:
///     kind: "iir" or "fir"
///     band: "lowpass", "highpass", "bandpass" or "bandstop"
///     cutoffs: One or two cutoff frequencies in Hz
///     sample_rate: Sample rate in Hz
///     order: IIR order
///     family: IIR family ("butterworth", "chebyshev1", "chebyshev2", "elliptic", "bessel")
///     rp: Passband ripple in dB (chebyshev1/elliptic)
///     rs: Stopband attenuation in dB (chebyshev2/elliptic)
///     attenuation: FIR stopband attenuation in dB
///     transition: FIR transition width in Hz
///
/// Returns:
///     Tuple of (numerator, denominator) numpy arrays; FIR denominator is [1.0]
#[pyfunction]
#[pyo3(signature = (kind, band, cutoffs, sample_rate, order=4, family="butterworth", rp=1.0, rs=40.0, attenuation=65.0, transition=24.0))]
#[allow(clippy::too_many_arguments)]
pub fn design<'py>(
    py: Python<'py>,
    kind: &str,
    band: &str,
    cutoffs: Vec<f64>,
    sample_rate: u32,
    order: usize,
    family: &str,
    rp: f64,
    rs: f64,
    attenuation: f64,
    transition: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let band: BandType = band.parse()?;
    let spec = match kind.to_ascii_lowercase().as_str() {
        "iir" => {
            let family: FilterFamily = family.parse()?;
            FilterSpec::iir(sample_rate, band, cutoffs, order, family).with_tolerances(rp, rs)
        }
        "fir" => FilterSpec::fir(sample_rate, band, cutoffs, attenuation, transition),
        other => {
            return Err(pyo3::exceptions::PyValueError::new_err(format!(
                "unknown filter kind '{other}'"
            )))
        }
    };

    let coefficients = filters::design(&spec)?;
    Ok((
        PyArray1::from_slice(py, coefficients.numerator()),
        PyArray1::from_slice(py, coefficients.denominator()),
    ))
}

/// Apply a transfer function to a signal
///
/// Args:
///     signal: Input samples
///     sample_rate: Sample rate in Hz
///     numerator: Numerator coefficients (FIR taps)
///     denominator: Denominator coefficients ([1.0] for FIR)
///     zero_phase: Forward-backward filtering
///
/// Returns:
///     Filtered samples as numpy array
#[pyfunction]
#[pyo3(signature = (signal, sample_rate, numerator, denominator, zero_phase=true))]
pub fn apply<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: u32,
    numerator: PyReadonlyArray1<f64>,
    denominator: PyReadonlyArray1<f64>,
    zero_phase: bool,
) -> PyResult<&'py PyArray1<f64>> {
    let buffer = AudioBuffer::new(sample_rate, as_slice(&signal)?.to_vec())?;
    let denominator = as_slice(&denominator)?;
    let coefficients = if denominator == [1.0] {
        FilterCoefficients::Fir {
            taps: as_slice(&numerator)?.to_vec(),
        }
    } else {
        FilterCoefficients::Iir {
            numerator: as_slice(&numerator)?.to_vec(),
            denominator: denominator.to_vec(),
        }
    };

    let output = py.allow_threads(|| filters::apply(&buffer, &coefficients, zero_phase))?;
    Ok(PyArray1::from_vec(py, output.into_samples()))
}
