//! Filter design entry point and Kaiser-window FIR design
//!
//! FIR filters use the windowing method: an ideal band response built from
//! sinc differences, shaped by a Kaiser window whose β and length follow
//! from the requested attenuation and transition width.

use super::iir::design_iir;
use super::spec::{BandType, FilterCoefficients, FilterKind, FilterSpec};
use super::windows::{generate_window, WindowType};
use crate::error::{EngineError, Result};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Design a filter from its specification
///
/// Dispatches on the design method. All validation failures surface as
/// `EngineError::InvalidSpec`.
pub fn design(spec: &FilterSpec) -> Result<FilterCoefficients> {
    match spec.kind {
        FilterKind::Iir { .. } => design_iir(spec),
        FilterKind::Fir { .. } => design_fir(spec),
    }
}

/// Longest FIR the windowing design will produce
pub const MAX_FIR_TAPS: usize = 1 << 24;

/// Kaiser window β for a target stopband attenuation (dB)
pub fn kaiser_beta(attenuation_db: f64) -> f64 {
    if attenuation_db > 50.0 {
        0.1102 * (attenuation_db - 8.7)
    } else if attenuation_db > 21.0 {
        0.5842 * (attenuation_db - 21.0).powf(0.4) + 0.07886 * (attenuation_db - 21.0)
    } else {
        0.0
    }
}

/// Kaiser filter length and β
///
/// # Arguments
/// * `attenuation_db` - Stopband attenuation (dB), at least 8
/// * `width` - Transition width normalized to Nyquist, in (0, 1)
///
/// # Returns
/// `(num_taps, beta)`, where the tap count is rounded up to odd. Fails when
/// the pair would need more than [`MAX_FIR_TAPS`] taps.
pub fn kaiser_order(attenuation_db: f64, width: f64) -> Result<(usize, f64)> {
    if !(attenuation_db.is_finite() && attenuation_db >= 8.0) {
        return Err(EngineError::invalid_spec(format!(
            "FIR attenuation {attenuation_db} dB is too small for a Kaiser design (need >= 8 dB)"
        )));
    }
    if !(width.is_finite() && width > 0.0 && width < 1.0) {
        return Err(EngineError::invalid_spec(
            "FIR transition width must lie strictly between 0 and the Nyquist frequency",
        ));
    }

    let raw = (attenuation_db - 7.95) / (2.285 * PI * width) + 1.0;
    if !raw.is_finite() || raw >= MAX_FIR_TAPS as f64 {
        return Err(EngineError::invalid_spec(format!(
            "FIR transition width {width} (normalized) needs more than {MAX_FIR_TAPS} taps"
        )));
    }
    let mut num_taps = raw.ceil() as usize;
    // Type I: highpass and bandstop need a tap at the center
    if num_taps % 2 == 0 {
        num_taps += 1;
    }

    Ok((num_taps, kaiser_beta(attenuation_db)))
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Passbands of the ideal response, as Nyquist-normalized `(left, right)` edges
fn ideal_bands(band_type: BandType, wn: &[f64]) -> Vec<(f64, f64)> {
    match band_type {
        BandType::Lowpass => vec![(0.0, wn[0])],
        BandType::Highpass => vec![(wn[0], 1.0)],
        BandType::Bandpass => vec![(wn[0], wn[1])],
        BandType::Bandstop => vec![(0.0, wn[0]), (wn[1], 1.0)],
    }
}

/// Design a linear-phase FIR filter with a Kaiser window
///
/// # Algorithm
/// 1. Length and β from attenuation and transition width
/// 2. Ideal impulse response as a sum of sinc differences per passband
/// 3. Multiply by the Kaiser window
/// 4. Scale for unity gain at the center of the first passband
pub fn design_fir(spec: &FilterSpec) -> Result<FilterCoefficients> {
    let FilterKind::Fir {
        stopband_attenuation_db,
        transition_width_hz,
    } = spec.kind
    else {
        return Err(EngineError::invalid_spec("expected an FIR specification"));
    };

    let wn = spec.normalized_cutoffs()?;
    let (num_taps, beta) = kaiser_order(stopband_attenuation_db, transition_width_hz / spec.nyquist())?;

    let bands = ideal_bands(spec.band_type, &wn);
    let window = generate_window(WindowType::Kaiser { beta }, num_taps);
    let center = (num_taps - 1) as f64 / 2.0;

    let mut taps: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(n, &w)| {
            let m = n as f64 - center;
            let ideal: f64 = bands
                .iter()
                .map(|&(left, right)| right * sinc(right * m) - left * sinc(left * m))
                .sum();
            ideal * w
        })
        .collect();
    // Type I linear phase: h[n] == h[N-1-n] bit for bit
    for n in 0..num_taps / 2 {
        taps[num_taps - 1 - n] = taps[n];
    }

    let (left, right) = bands[0];
    let scale_frequency = if left == 0.0 {
        0.0
    } else if right == 1.0 {
        1.0
    } else {
        0.5 * (left + right)
    };
    let gain: f64 = taps
        .iter()
        .enumerate()
        .map(|(n, &h)| h * (PI * (n as f64 - center) * scale_frequency).cos())
        .sum();
    if gain == 0.0 {
        return Err(EngineError::invalid_spec("FIR design produced zero passband gain"));
    }
    for h in taps.iter_mut() {
        *h /= gain;
    }

    log::debug!(
        "Designed {:?} FIR: {} taps, Kaiser beta {:.3}",
        spec.band_type,
        num_taps,
        beta
    );

    Ok(FilterCoefficients::Fir { taps })
}

/// Evaluate b(z)/a(z) at `z = e^{jω}`
fn evaluate(b: &[f64], a: &[f64], omega: f64) -> Complex64 {
    let horner = |coeffs: &[f64]| {
        let z_inv = Complex64::from_polar(1.0, -omega);
        coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
    };
    horner(b) / horner(a)
}

/// Calculate frequency response at given frequencies
///
/// # Arguments
/// * `coefficients` - Designed filter
/// * `frequencies_hz` - Frequencies to evaluate (Hz)
/// * `sample_rate` - Sample rate the filter was designed for (Hz)
///
/// # Returns
/// Complex frequency response H(e^jω)
pub fn frequency_response(
    coefficients: &FilterCoefficients,
    frequencies_hz: &[f64],
    sample_rate: f64,
) -> Vec<Complex64> {
    let b = coefficients.numerator();
    let a = coefficients.denominator();
    frequencies_hz
        .iter()
        .map(|&f| evaluate(b, a, 2.0 * PI * f / sample_rate))
        .collect()
}

/// Calculate magnitude response in dB
pub fn magnitude_response_db(
    coefficients: &FilterCoefficients,
    frequencies_hz: &[f64],
    sample_rate: f64,
) -> Vec<f64> {
    frequency_response(coefficients, frequencies_hz, sample_rate)
        .iter()
        .map(|c| 20.0 * c.norm().log10())
        .collect()
}

/// |H(f)| of the transfer function b/a at a single frequency
pub fn magnitude_at(b: &[f64], a: &[f64], freq_hz: f64, sample_rate: f64) -> f64 {
    evaluate(b, a, 2.0 * PI * freq_hz / sample_rate).norm()
}
