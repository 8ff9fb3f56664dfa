//! PyO3 bindings for Python integration

use crate::error::EngineError;
use numpy::PyReadonlyArray1;
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

mod audio_bindings;
mod filter_bindings;
mod spectrum_bindings;

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::DecodeFailure { .. } | EngineError::WriteFailure { .. } => {
                PyIOError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Borrow a contiguous numpy array as a slice
pub(crate) fn as_slice<'a>(array: &'a PyReadonlyArray1<'_, f64>) -> PyResult<&'a [f64]> {
    array
        .as_slice()
        .map_err(|_| PyValueError::new_err("array must be contiguous"))
}

/// Python module definition
#[pymodule]
fn audiofilter(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(audio_bindings::decode, m)?)?;
    m.add_function(wrap_pyfunction!(audio_bindings::encode, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::design, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::apply, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::transform, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::notch_remove, m)?)?;

    m.add_class::<audio_bindings::PySignalStore>()?;

    Ok(())
}
