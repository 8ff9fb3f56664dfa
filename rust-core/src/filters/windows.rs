//! Window functions for FIR filter design and spectral analysis

use std::f64::consts::PI;

/// Taper applied to FIR prototypes and to signals before a forward transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowType {
    Hann,
    Hamming,
    Blackman,

    /// No taper
    Rectangular,

    /// `I0(beta * sqrt(1 - x^2)) / I0(beta)` over `x` in [-1, 1]
    Kaiser { beta: f64 },
}

impl WindowType {
    /// Coefficients `a_k` of the cosine-sum form `sum (-1)^k a_k cos(2 pi k n / (M-1))`
    fn cosine_terms(&self) -> Option<&'static [f64]> {
        match self {
            WindowType::Hann => Some(&[0.5, 0.5]),
            WindowType::Hamming => Some(&[0.54, 0.46]),
            WindowType::Blackman => Some(&[0.42, 0.5, 0.08]),
            WindowType::Rectangular | WindowType::Kaiser { .. } => None,
        }
    }
}

impl std::str::FromStr for WindowType {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "rectangular" | "boxcar" | "none" => Ok(WindowType::Rectangular),
            other => Err(crate::error::EngineError::invalid_spec(format!(
                "unknown window '{other}'"
            ))),
        }
    }
}

/// Zeroth-order modified Bessel function of the first kind (power series)
pub fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    for k in 1..200 {
        let ratio = half / k as f64;
        term *= ratio * ratio;
        sum += term;
        if term < sum * 1e-17 {
            break;
        }
    }
    sum
}

/// Symmetric window of `length` points
///
/// Lengths 0 and 1 yield an empty window and `[1.0]` respectively.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }
    let span = (length - 1) as f64;

    if let Some(terms) = window_type.cosine_terms() {
        return (0..length)
            .map(|n| {
                let phase = 2.0 * PI * n as f64 / span;
                terms
                    .iter()
                    .enumerate()
                    .map(|(k, &a)| {
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * a * (k as f64 * phase).cos()
                    })
                    .sum::<f64>()
            })
            .collect();
    }

    match window_type {
        WindowType::Kaiser { beta } => {
            let norm = bessel_i0(beta);
            let center = span / 2.0;
            // n - center is exact, so mirrored points get bit-identical values
            (0..length)
                .map(|n| {
                    let x = (n as f64 - center) / center;
                    bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / norm
                })
                .collect()
        }
        _ => vec![1.0; length],
    }
}
