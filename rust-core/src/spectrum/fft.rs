//! Forward spectra and frequency-domain notch removal
//!
//! The one-sided forward transform uses realfft; notch removal needs the
//! two-sided spectrum so both mirrored bins of a band can be cleared, which
//! keeps the inverse real up to rounding noise.

use super::windowing::{apply_window, window_correction_factor};
use crate::audio::AudioBuffer;
use crate::error::{EngineError, Result};
use crate::filters::windows::WindowType;
use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

/// Non-negative half of a spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub sample_rate: u32,

    /// Bin frequencies in Hz, `k * sample_rate / N`
    pub frequencies: Vec<f64>,

    /// Complex bin values, same length as `frequencies`
    pub values: Vec<Complex64>,
}

impl Spectrum {
    /// Magnitude spectrum |X[k]|
    pub fn magnitudes(&self) -> Vec<f64> {
        self.values.iter().map(|c| c.norm()).collect()
    }

    /// Magnitude spectrum in dB: 20*log10(|X[k]|/reference)
    pub fn magnitudes_db(&self, reference: f64) -> Vec<f64> {
        self.values
            .iter()
            .map(|c| {
                let mag_clamped = c.norm().max(1e-10);
                20.0 * (mag_clamped / reference).log10()
            })
            .collect()
    }

    /// The `count` strongest bins as `(frequency_hz, magnitude)`, strongest first
    pub fn strongest(&self, count: usize) -> Vec<(f64, f64)> {
        let mut bins: Vec<(f64, f64)> = self
            .frequencies
            .iter()
            .zip(&self.values)
            .map(|(&f, c)| (f, c.norm()))
            .collect();
        bins.sort_by(|a, b| b.1.total_cmp(&a.1));
        bins.truncate(count);
        bins
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Spectral analysis of audio buffers
#[derive(Debug, Clone, Copy)]
pub struct SpectralAnalyzer {
    window: WindowType,
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self {
            window: WindowType::Rectangular,
        }
    }
}

impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window the signal before the forward transform
    ///
    /// Magnitudes are corrected so a windowed sinusoid keeps its peak height.
    pub fn with_window(window: WindowType) -> Self {
        Self { window }
    }

    pub fn window(&self) -> WindowType {
        self.window
    }

    /// One-sided spectrum, `N/2 + 1` bins for an `N`-sample buffer
    pub fn forward_transform(&self, buffer: &AudioBuffer) -> Result<Spectrum> {
        if buffer.is_empty() {
            return Err(EngineError::EmptyBuffer);
        }

        let n = buffer.len();
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(n);

        let mut input = apply_window(buffer.samples(), self.window);
        let mut values = r2c.make_output_vec();
        r2c.process(&mut input, &mut values)
            .map_err(|e| EngineError::Transform(e.to_string()))?;

        if self.window != WindowType::Rectangular {
            let correction = window_correction_factor(self.window, n);
            for v in values.iter_mut() {
                *v *= correction;
            }
        }

        let sample_rate = buffer.sample_rate();
        let bin_width = sample_rate as f64 / n as f64;
        let frequencies = (0..values.len()).map(|k| k as f64 * bin_width).collect();

        log::debug!("Forward transform: {} samples -> {} bins", n, values.len());

        Ok(Spectrum {
            sample_rate,
            frequencies,
            values,
        })
    }

    /// Remove every component between `low_hz` and `high_hz` (inclusive)
    ///
    /// Both positive and negative frequency bins of the band are zeroed; the
    /// imaginary residue of the inverse transform is discarded.
    pub fn notch_remove(&self, buffer: &AudioBuffer, low_hz: f64, high_hz: f64) -> Result<AudioBuffer> {
        if !(low_hz.is_finite() && high_hz.is_finite() && low_hz >= 0.0 && low_hz <= high_hz) {
            return Err(EngineError::invalid_spec(format!(
                "notch band must satisfy 0 <= low <= high, got [{low_hz}, {high_hz}]"
            )));
        }
        if buffer.is_empty() {
            return Err(EngineError::EmptyBuffer);
        }

        let n = buffer.len();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let ifft = planner.plan_fft_inverse(n);

        let mut bins: Vec<Complex64> = buffer
            .samples()
            .iter()
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        fft.process(&mut bins);

        let bin_width = buffer.sample_rate() as f64 / n as f64;
        let mut removed = 0usize;
        for (k, bin) in bins.iter_mut().enumerate() {
            let frequency = signed_bin_frequency(k, n, bin_width).abs();
            if frequency >= low_hz && frequency <= high_hz {
                *bin = Complex64::new(0.0, 0.0);
                removed += 1;
            }
        }

        ifft.process(&mut bins);
        let scale = 1.0 / n as f64;
        let samples = bins.iter().map(|c| c.re * scale).collect();

        log::debug!(
            "Notch [{}, {}] Hz cleared {} of {} bins",
            low_hz,
            high_hz,
            removed,
            n
        );

        Ok(buffer.with_samples(samples))
    }
}

/// Frequency of bin `k` in a two-sided `n`-point spectrum (negative above the midpoint)
fn signed_bin_frequency(k: usize, n: usize, bin_width: f64) -> f64 {
    if k <= (n - 1) / 2 {
        k as f64 * bin_width
    } else {
        (k as f64 - n as f64) * bin_width
    }
}

/// One-sided spectrum with a rectangular window
pub fn transform(buffer: &AudioBuffer) -> Result<Spectrum> {
    SpectralAnalyzer::default().forward_transform(buffer)
}

/// Notch removal with the default analyzer
pub fn notch_remove(buffer: &AudioBuffer, low_hz: f64, high_hz: f64) -> Result<AudioBuffer> {
    SpectralAnalyzer::default().notch_remove(buffer, low_hz, high_hz)
}
