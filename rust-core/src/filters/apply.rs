//! Filter application: causal and zero-phase
//!
//! IIR filters run through a transposed direct form II difference equation.
//! Zero-phase application filters forward, then backward over the reversed
//! result, with odd-reflection padding and steady-state initial conditions
//! so neither edge shows a start-up transient.

use super::fast_fir::FastFirFilter;
use super::fir::FirFilter;
use super::spec::FilterCoefficients;
use crate::audio::AudioBuffer;
use crate::error::{EngineError, Result};

/// Tap count at or above which FIR convolution moves to the FFT path
pub const DEFAULT_FFT_THRESHOLD: usize = 64;

/// Smallest input block fed to one FFT in overlap-add mode
const MIN_FFT_BLOCK: usize = 1024;

/// Coefficients divided by a[0] and zero-padded to a common length
fn normalize(b: &[f64], a: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    let a0 = match a.first() {
        Some(&a0) if a0 != 0.0 && a0.is_finite() => a0,
        _ => {
            return Err(EngineError::invalid_spec(
                "denominator must start with a finite, non-zero coefficient",
            ))
        }
    };
    if b.is_empty() {
        return Err(EngineError::invalid_spec("numerator has no coefficients"));
    }

    let n = b.len().max(a.len());
    let mut b_norm: Vec<f64> = b.iter().map(|&v| v / a0).collect();
    let mut a_norm: Vec<f64> = a.iter().map(|&v| v / a0).collect();
    b_norm.resize(n, 0.0);
    a_norm.resize(n, 0.0);
    Ok((b_norm, a_norm))
}

/// Run the difference equation b/a over `x`
///
/// # Arguments
/// * `b`, `a` - Transfer function coefficients
/// * `x` - Input samples
/// * `zi` - Initial state (`max(len b, len a) - 1` values), zeros when `None`
pub fn lfilter(b: &[f64], a: &[f64], x: &[f64], zi: Option<&[f64]>) -> Result<Vec<f64>> {
    let (b, a) = normalize(b, a)?;
    let n = b.len();

    let mut z = match zi {
        Some(zi) if zi.len() == n - 1 => zi.to_vec(),
        Some(zi) => {
            return Err(EngineError::invalid_spec(format!(
                "initial state has {} values, expected {}",
                zi.len(),
                n - 1
            )))
        }
        None => vec![0.0; n - 1],
    };

    let mut y = Vec::with_capacity(x.len());
    for &xn in x {
        let yn = b[0] * xn + z.first().copied().unwrap_or(0.0);
        for i in 0..n.saturating_sub(2) {
            z[i] = b[i + 1] * xn + z[i + 1] - a[i + 1] * yn;
        }
        if n > 1 {
            z[n - 2] = b[n - 1] * xn - a[n - 1] * yn;
        }
        y.push(yn);
    }
    Ok(y)
}

/// Initial state for a step response already in steady state
///
/// Scaling the result by `x[0]` starts `lfilter` as if the input had been
/// constant at `x[0]` forever.
pub fn lfilter_zi(b: &[f64], a: &[f64]) -> Result<Vec<f64>> {
    let (b, a) = normalize(b, a)?;
    let n = b.len();
    if n == 1 {
        return Ok(Vec::new());
    }

    let a_sum: f64 = a.iter().sum();
    if a_sum == 0.0 {
        return Err(EngineError::invalid_spec(
            "filter has a pole at z = 1, no steady state exists",
        ));
    }

    let b_sum: f64 = (1..n).map(|i| b[i] - a[i] * b[0]).sum();
    let mut zi = vec![0.0; n - 1];
    zi[0] = b_sum / a_sum;

    let mut a_acc = 1.0;
    let mut c_acc = 0.0;
    for k in 1..n - 1 {
        a_acc += a[k];
        c_acc += b[k] - a[k] * b[0];
        zi[k] = a_acc * zi[0] - c_acc;
    }
    Ok(zi)
}

/// Forward-backward filtering with zero net phase
///
/// Pads `3·max(len b, len a)` samples of odd reflection on each side.
/// Fails with `InsufficientLength` unless the input is longer than the padding.
pub fn filtfilt(b: &[f64], a: &[f64], x: &[f64]) -> Result<Vec<f64>> {
    let padlen = 3 * b.len().max(a.len());
    let len = x.len();
    if len <= padlen {
        return Err(EngineError::InsufficientLength {
            samples: len,
            required: padlen,
        });
    }

    let first = x[0];
    let last = x[len - 1];
    let mut extended = Vec::with_capacity(len + 2 * padlen);
    extended.extend((1..=padlen).rev().map(|i| 2.0 * first - x[i]));
    extended.extend_from_slice(x);
    extended.extend((1..=padlen).map(|i| 2.0 * last - x[len - 1 - i]));

    let zi = lfilter_zi(b, a)?;

    let scaled = |x0: f64| zi.iter().map(|&z| z * x0).collect::<Vec<f64>>();
    let mut y = lfilter(b, a, &extended, Some(&scaled(extended[0])))?;
    y.reverse();
    let mut y = lfilter(b, a, &y, Some(&scaled(y[0])))?;
    y.reverse();

    Ok(y[padlen..padlen + len].to_vec())
}

/// Executes designed filters against buffers
#[derive(Debug, Clone, Copy)]
pub struct FilterApplier {
    fft_threshold: usize,
}

impl Default for FilterApplier {
    fn default() -> Self {
        Self {
            fft_threshold: DEFAULT_FFT_THRESHOLD,
        }
    }
}

impl FilterApplier {
    /// Applier switching to FFT convolution at `fft_threshold` taps
    pub fn new(fft_threshold: usize) -> Self {
        Self {
            fft_threshold: fft_threshold.max(1),
        }
    }

    /// Apply any designed filter
    ///
    /// FIR taps with `zero_phase` go through the same forward-backward path
    /// as IIR filters, which removes their `(N-1)/2` delay.
    pub fn apply(
        &self,
        buffer: &AudioBuffer,
        coefficients: &FilterCoefficients,
        zero_phase: bool,
    ) -> Result<AudioBuffer> {
        match coefficients {
            FilterCoefficients::Iir {
                numerator,
                denominator,
            } => self.apply_iir(buffer, numerator, denominator, zero_phase),
            FilterCoefficients::Fir { taps } if zero_phase => self.apply_iir(buffer, taps, &[1.0], true),
            FilterCoefficients::Fir { taps } => self.apply_fir(buffer, taps),
        }
    }

    /// Apply a rational transfer function
    pub fn apply_iir(
        &self,
        buffer: &AudioBuffer,
        numerator: &[f64],
        denominator: &[f64],
        zero_phase: bool,
    ) -> Result<AudioBuffer> {
        let samples = if zero_phase {
            filtfilt(numerator, denominator, buffer.samples())?
        } else {
            lfilter(numerator, denominator, buffer.samples(), None)?
        };
        log::debug!(
            "Applied IIR ({} samples, zero_phase = {})",
            samples.len(),
            zero_phase
        );
        Ok(buffer.with_samples(samples))
    }

    /// Causal convolution with the taps, same length as the input
    pub fn apply_fir(&self, buffer: &AudioBuffer, taps: &[f64]) -> Result<AudioBuffer> {
        if taps.is_empty() {
            return Err(EngineError::invalid_spec("FIR filter has no taps"));
        }

        let input = buffer.samples();
        let samples = if taps.len() >= self.fft_threshold && !input.is_empty() {
            let block = (4 * taps.len()).max(MIN_FFT_BLOCK).min(input.len());
            FastFirFilter::new(taps, block).filter(input)
        } else {
            FirFilter::new(taps.to_vec()).filter(input)
        };
        log::debug!("Applied {}-tap FIR to {} samples", taps.len(), samples.len());
        Ok(buffer.with_samples(samples))
    }
}

/// Apply a designed filter with the default applier
pub fn apply(buffer: &AudioBuffer, coefficients: &FilterCoefficients, zero_phase: bool) -> Result<AudioBuffer> {
    FilterApplier::default().apply(buffer, coefficients, zero_phase)
}

/// Apply an IIR transfer function with the default applier
pub fn apply_iir(
    buffer: &AudioBuffer,
    numerator: &[f64],
    denominator: &[f64],
    zero_phase: bool,
) -> Result<AudioBuffer> {
    FilterApplier::default().apply_iir(buffer, numerator, denominator, zero_phase)
}

/// Apply FIR taps causally with the default applier
pub fn apply_fir(buffer: &AudioBuffer, taps: &[f64]) -> Result<AudioBuffer> {
    FilterApplier::default().apply_fir(buffer, taps)
}
