//! Python bindings for file I/O and session storage

use super::as_slice;
use crate::audio::{self, AudioBuffer, AudioFormat, SignalSource, SignalStore};
use crate::filters::{BandType, FilterFamily, FilterSpec};
use num_complex::Complex64;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn parse_source(source: &str) -> PyResult<SignalSource> {
    match source.to_ascii_lowercase().as_str() {
        "original" => Ok(SignalSource::Original),
        "processed" => Ok(SignalSource::Processed),
        other => Err(PyValueError::new_err(format!("unknown signal '{other}'"))),
    }
}

/// Decode an audio file
///
/// Returns:
///     Tuple of (samples, sample_rate)
#[pyfunction]
pub fn decode<'py>(py: Python<'py>, path: &str) -> PyResult<(&'py PyArray1<f64>, u32)> {
    let buffer = py.allow_threads(|| audio::decode(path))?;
    let sample_rate = buffer.sample_rate();
    Ok((PyArray1::from_vec(py, buffer.into_samples()), sample_rate))
}

/// Encode samples as mono 16-bit PCM; format defaults to the path's extension
#[pyfunction]
#[pyo3(signature = (signal, sample_rate, path, format=None))]
pub fn encode(
    signal: PyReadonlyArray1<f64>,
    sample_rate: u32,
    path: &str,
    format: Option<&str>,
) -> PyResult<()> {
    let buffer = AudioBuffer::new(sample_rate, as_slice(&signal)?.to_vec())?;
    let format = match format {
        Some(name) => name.parse::<AudioFormat>()?,
        None => AudioFormat::from_path(path)?,
    };
    audio::encode(&buffer, path, format)?;
    Ok(())
}

/// Original and processed signal of one session
#[pyclass(name = "SignalStore")]
pub struct PySignalStore {
    store: SignalStore,
}

#[pymethods]
impl PySignalStore {
    /// Open a session from an audio file
    #[new]
    fn new(path: &str) -> PyResult<Self> {
        Ok(Self {
            store: SignalStore::open(path)?,
        })
    }

    #[getter]
    fn sample_rate(&self) -> u32 {
        self.store.original().sample_rate()
    }

    /// Samples of "original" or "processed"
    #[pyo3(signature = (source="original"))]
    fn signal<'py>(&self, py: Python<'py>, source: &str) -> PyResult<&'py PyArray1<f64>> {
        let buffer = self.store.signal(parse_source(source)?)?;
        Ok(PyArray1::from_slice(py, buffer.samples()))
    }

    /// Time of each sample in seconds
    fn time_axis<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.store.original().time_axis())
    }

    /// Design an IIR filter and apply it to the original
    #[pyo3(signature = (band, cutoffs, order=4, family="butterworth", rp=1.0, rs=40.0, zero_phase=true))]
    #[allow(clippy::too_many_arguments)]
    fn apply_iir(
        &mut self,
        band: &str,
        cutoffs: Vec<f64>,
        order: usize,
        family: &str,
        rp: f64,
        rs: f64,
        zero_phase: bool,
    ) -> PyResult<()> {
        let band: BandType = band.parse()?;
        let family: FilterFamily = family.parse()?;
        let spec = FilterSpec::iir(self.sample_rate(), band, cutoffs, order, family).with_tolerances(rp, rs);
        self.store.apply_filter(&spec, zero_phase)?;
        Ok(())
    }

    /// Design a Kaiser FIR filter and apply it causally to the original
    #[pyo3(signature = (band, cutoffs, attenuation=65.0, transition=24.0))]
    fn apply_fir(&mut self, band: &str, cutoffs: Vec<f64>, attenuation: f64, transition: f64) -> PyResult<()> {
        let band: BandType = band.parse()?;
        let spec = FilterSpec::fir(self.sample_rate(), band, cutoffs, attenuation, transition);
        self.store.apply_filter(&spec, false)?;
        Ok(())
    }

    /// Spectrum of "original" or "processed" as (frequencies, values)
    #[pyo3(signature = (source="original"))]
    fn transform<'py>(
        &self,
        py: Python<'py>,
        source: &str,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>)> {
        let result = self.store.transform(parse_source(source)?)?;
        Ok((
            PyArray1::from_vec(py, result.spectrum.frequencies),
            PyArray1::from_vec(py, result.spectrum.values),
        ))
    }

    /// Notch-filter a stored signal into the processed slot
    #[pyo3(signature = (low_hz, high_hz, source="original"))]
    fn notch_remove(&mut self, low_hz: f64, high_hz: f64, source: &str) -> PyResult<()> {
        self.store.notch_remove(parse_source(source)?, low_hz, high_hz)?;
        Ok(())
    }

    /// Write the processed signal
    #[pyo3(signature = (path, format=None))]
    fn save(&self, path: &str, format: Option<&str>) -> PyResult<()> {
        let format = match format {
            Some(name) => name.parse::<AudioFormat>()?,
            None => AudioFormat::from_path(path)?,
        };
        self.store.save(path, format)?;
        Ok(())
    }
}
