//! Spectral analysis with FFT

pub mod fft;
pub mod windowing;

pub use fft::{notch_remove, transform, SpectralAnalyzer, Spectrum};
pub use windowing::apply_window;
