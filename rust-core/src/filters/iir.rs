//! IIR filter design from analog prototypes
//!
//! Pipeline: analog lowpass prototype (zeros, poles, gain) → band transform
//! at pre-warped cutoffs → bilinear transform → transfer-function polynomials.

use super::bessel;
use super::elliptic::{arc_jac_sc1, ellipdeg, ellipj, ellipk};
use super::spec::{BandType, FilterCoefficients, FilterFamily, FilterKind, FilterSpec};
use crate::error::{EngineError, Result};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Sample rate used internally for the bilinear transform
const DESIGN_FS: f64 = 2.0;

/// Threshold below which a root component is treated as zero
const ROOT_EPSILON: f64 = 2e-16;

/// Zero/pole/gain representation of a transfer function
#[derive(Debug, Clone)]
pub struct Zpk {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl Zpk {
    fn all_pole(poles: Vec<Complex64>, gain: f64) -> Self {
        Self {
            zeros: Vec::new(),
            poles,
            gain,
        }
    }

    /// Excess of poles over zeros
    fn degree(&self) -> usize {
        self.poles.len() - self.zeros.len()
    }
}

fn product_of_negated(roots: &[Complex64]) -> Complex64 {
    roots.iter().fold(Complex64::new(1.0, 0.0), |acc, &r| acc * -r)
}

/// 10^x - 1 without cancellation for small x
fn pow10m1(x: f64) -> f64 {
    (x * std::f64::consts::LN_10).exp_m1()
}

/// Odd-spaced indices -n+1, -n+3, ..., n-1
fn symmetric_indices(n: usize) -> impl Iterator<Item = f64> {
    (0..n).map(move |i| (2 * i) as f64 - n as f64 + 1.0)
}

impl FilterFamily {
    /// Normalized analog lowpass prototype (cutoff 1 rad/s)
    pub fn prototype(&self, order: usize, passband_ripple_db: f64, stopband_attenuation_db: f64) -> Result<Zpk> {
        match self {
            FilterFamily::Butterworth => Ok(butterworth_prototype(order)),
            FilterFamily::Chebyshev1 => Ok(chebyshev1_prototype(order, passband_ripple_db)),
            FilterFamily::Chebyshev2 => Ok(chebyshev2_prototype(order, stopband_attenuation_db)),
            FilterFamily::Elliptic => {
                elliptic_prototype(order, passband_ripple_db, stopband_attenuation_db)
            }
            FilterFamily::Bessel => bessel_prototype(order),
        }
    }
}

/// Poles evenly spaced on the left half of the unit circle
pub fn butterworth_prototype(order: usize) -> Zpk {
    let poles = symmetric_indices(order)
        .map(|m| -Complex64::new(0.0, PI * m / (2.0 * order as f64)).exp())
        .collect();
    Zpk::all_pole(poles, 1.0)
}

/// Poles on an ellipse; passband ripples between 0 and -rp dB
pub fn chebyshev1_prototype(order: usize, rp: f64) -> Zpk {
    let eps = pow10m1(0.1 * rp).sqrt();
    let mu = (1.0 / eps).asinh() / order as f64;

    let poles: Vec<Complex64> = symmetric_indices(order)
        .map(|m| {
            let theta = PI * m / (2.0 * order as f64);
            -Complex64::new(mu, theta).sinh()
        })
        .collect();

    let mut gain = product_of_negated(&poles).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }
    Zpk::all_pole(poles, gain)
}

/// Zeros on the imaginary axis; stopband ripples at -rs dB
pub fn chebyshev2_prototype(order: usize, rs: f64) -> Zpk {
    let de = 1.0 / pow10m1(0.1 * rs).sqrt();
    let mu = (1.0 / de).asinh() / order as f64;
    let n = order as f64;

    // The odd-order middle index maps to a zero at infinity
    let zeros: Vec<Complex64> = symmetric_indices(order)
        .filter(|&m| m != 0.0)
        .map(|m| Complex64::new(0.0, 1.0 / (m * PI / (2.0 * n)).sin()))
        .collect();

    let poles: Vec<Complex64> = symmetric_indices(order)
        .map(|m| {
            let p = -Complex64::new(0.0, PI * m / (2.0 * n)).exp();
            let warped = Complex64::new(mu.sinh() * p.re, mu.cosh() * p.im);
            1.0 / warped
        })
        .collect();

    let gain = (product_of_negated(&poles) / product_of_negated(&zeros)).re;
    Zpk { zeros, poles, gain }
}

/// Equiripple in both bands (Cauer)
pub fn elliptic_prototype(order: usize, rp: f64, rs: f64) -> Result<Zpk> {
    if order == 1 {
        let p = -(1.0 / pow10m1(0.1 * rp)).sqrt();
        return Ok(Zpk::all_pole(vec![Complex64::new(p, 0.0)], -p));
    }

    let eps_sq = pow10m1(0.1 * rp);
    let eps = eps_sq.sqrt();
    let ck1_sq = eps_sq / pow10m1(0.1 * rs);
    if !(ck1_sq > 0.0 && ck1_sq < 1.0) {
        return Err(EngineError::invalid_spec(
            "cannot design an elliptic filter with the given ripple and attenuation",
        ));
    }

    let val0 = ellipk(ck1_sq);
    let m = ellipdeg(order, ck1_sq);
    let capk = ellipk(m);
    let n = order as f64;

    let jacobi: Vec<(f64, f64, f64)> = ((1 - order % 2)..order)
        .step_by(2)
        .map(|j| ellipj(j as f64 * capk / n, m))
        .collect();

    let mut zeros = Vec::with_capacity(order);
    for &(s, _, _) in &jacobi {
        if s.abs() > ROOT_EPSILON {
            let z = Complex64::new(0.0, 1.0 / (m.sqrt() * s));
            zeros.push(z);
            zeros.push(z.conj());
        }
    }

    let r = arc_jac_sc1(1.0 / eps, ck1_sq);
    let v0 = capk * r / (n * val0);
    let (sv, cv, dv) = ellipj(v0, 1.0 - m);

    let half: Vec<Complex64> = jacobi
        .iter()
        .map(|&(s, c, d)| {
            -Complex64::new(c * d * sv * cv, s * dv) / (1.0 - (d * sv).powi(2))
        })
        .collect();

    let mut poles = half.clone();
    if order % 2 == 1 {
        let norm = half.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        poles.extend(
            half.iter()
                .filter(|p| p.im.abs() > ROOT_EPSILON * norm)
                .map(|p| p.conj()),
        );
    } else {
        poles.extend(half.iter().map(|p| p.conj()));
    }

    let mut gain = (product_of_negated(&poles) / product_of_negated(&zeros)).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }
    Ok(Zpk { zeros, poles, gain })
}

/// Maximally flat delay; phase-normalized so the high-frequency asymptote
/// matches Butterworth and the DC gain is 1
pub fn bessel_prototype(order: usize) -> Result<Zpk> {
    // Reverse Bessel θ_n(s) = s^n·y_n(1/s) has constant term (2n)!/(2^n·n!)
    let theta0 = (1..=order).fold(1.0, |acc, k| acc * (order + k) as f64 / 2.0);

    // Substituting s = θ0^(1/n)·x makes the constant term 1
    let scale = theta0.powf(1.0 / order as f64);
    let poles = bessel::ordinary_zeros(order)?
        .into_iter()
        .map(|x| 1.0 / (x * scale))
        .collect();
    Ok(Zpk::all_pole(poles, 1.0))
}

/// Scale a lowpass prototype to cutoff `wo`
pub fn lowpass_to_lowpass(zpk: &Zpk, wo: f64) -> Zpk {
    Zpk {
        zeros: zpk.zeros.iter().map(|&z| z * wo).collect(),
        poles: zpk.poles.iter().map(|&p| p * wo).collect(),
        gain: zpk.gain * wo.powi(zpk.degree() as i32),
    }
}

/// Lowpass prototype to highpass at `wo`
pub fn lowpass_to_highpass(zpk: &Zpk, wo: f64) -> Zpk {
    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|&z| wo / z).collect();
    let poles = zpk.poles.iter().map(|&p| wo / p).collect();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(zpk.degree()));

    let gain = zpk.gain * (product_of_negated(&zpk.zeros) / product_of_negated(&zpk.poles)).re;
    Zpk { zeros, poles, gain }
}

/// Split each root r into the pair r ± sqrt(r² - wo²)
fn split_roots(roots: &[Complex64], wo: f64) -> Vec<Complex64> {
    let shifted: Vec<Complex64> = roots.iter().map(|&r| (r * r - wo * wo).sqrt()).collect();
    roots
        .iter()
        .zip(&shifted)
        .map(|(&r, &d)| r + d)
        .chain(roots.iter().zip(&shifted).map(|(&r, &d)| r - d))
        .collect()
}

/// Lowpass prototype to bandpass centred at `wo` with bandwidth `bw`
pub fn lowpass_to_bandpass(zpk: &Zpk, wo: f64, bw: f64) -> Zpk {
    let z_lp: Vec<Complex64> = zpk.zeros.iter().map(|&z| z * bw / 2.0).collect();
    let p_lp: Vec<Complex64> = zpk.poles.iter().map(|&p| p * bw / 2.0).collect();

    let mut zeros = split_roots(&z_lp, wo);
    zeros.extend(std::iter::repeat(Complex64::new(0.0, 0.0)).take(zpk.degree()));

    Zpk {
        zeros,
        poles: split_roots(&p_lp, wo),
        gain: zpk.gain * bw.powi(zpk.degree() as i32),
    }
}

/// Lowpass prototype to bandstop centred at `wo` with bandwidth `bw`
pub fn lowpass_to_bandstop(zpk: &Zpk, wo: f64, bw: f64) -> Zpk {
    let z_hp: Vec<Complex64> = zpk.zeros.iter().map(|&z| (bw / 2.0) / z).collect();
    let p_hp: Vec<Complex64> = zpk.poles.iter().map(|&p| (bw / 2.0) / p).collect();

    let mut zeros = split_roots(&z_hp, wo);
    let degree = zpk.degree();
    zeros.extend(std::iter::repeat(Complex64::new(0.0, wo)).take(degree));
    zeros.extend(std::iter::repeat(Complex64::new(0.0, -wo)).take(degree));

    let gain = zpk.gain * (product_of_negated(&zpk.zeros) / product_of_negated(&zpk.poles)).re;
    Zpk {
        zeros,
        poles: split_roots(&p_hp, wo),
        gain,
    }
}

/// Map an analog filter to the z-plane: s = 2·fs·(z - 1)/(z + 1)
pub fn bilinear(zpk: &Zpk, fs: f64) -> Zpk {
    let fs2 = Complex64::new(2.0 * fs, 0.0);

    let mut zeros: Vec<Complex64> = zpk.zeros.iter().map(|&z| (fs2 + z) / (fs2 - z)).collect();
    let poles = zpk.poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
    zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(zpk.degree()));

    let num = zpk.zeros.iter().fold(Complex64::new(1.0, 0.0), |acc, &z| acc * (fs2 - z));
    let den = zpk.poles.iter().fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
    Zpk {
        zeros,
        poles,
        gain: zpk.gain * (num / den).re,
    }
}

/// Expand roots into polynomial coefficients, highest power first
fn poly(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs.iter().map(|c| c.re).collect()
}

/// Numerator and denominator polynomials of a zero/pole/gain system
pub fn zpk_to_transfer_function(zpk: &Zpk) -> (Vec<f64>, Vec<f64>) {
    let numerator = poly(&zpk.zeros).iter().map(|c| c * zpk.gain).collect();
    (numerator, poly(&zpk.poles))
}

fn validate_tolerances(family: FilterFamily, rp: f64, rs: f64) -> Result<()> {
    if family.uses_passband_ripple() && !(rp.is_finite() && rp > 0.0) {
        return Err(EngineError::invalid_spec(format!(
            "{family:?} needs a positive passband ripple, got {rp} dB"
        )));
    }
    if family.uses_stopband_attenuation() && !(rs.is_finite() && rs > 0.0) {
        return Err(EngineError::invalid_spec(format!(
            "{family:?} needs a positive stopband attenuation, got {rs} dB"
        )));
    }
    if family == FilterFamily::Elliptic && rs <= rp {
        return Err(EngineError::invalid_spec(
            "elliptic stopband attenuation must exceed the passband ripple",
        ));
    }
    Ok(())
}

/// Design a digital IIR filter from its specification
///
/// Cutoffs are normalized to Nyquist and pre-warped so the digital filter
/// has its band edges exactly at the requested frequencies.
/// Bandpass and bandstop designs have twice the requested order.
pub fn design_iir(spec: &FilterSpec) -> Result<FilterCoefficients> {
    let FilterKind::Iir {
        order,
        family,
        passband_ripple_db,
        stopband_attenuation_db,
    } = spec.kind
    else {
        return Err(EngineError::invalid_spec("expected an IIR specification"));
    };

    if order == 0 {
        return Err(EngineError::invalid_spec("IIR order must be at least 1"));
    }
    let wn = spec.normalized_cutoffs()?;
    validate_tolerances(family, passband_ripple_db, stopband_attenuation_db)?;

    let prototype = family.prototype(order, passband_ripple_db, stopband_attenuation_db)?;

    let warped: Vec<f64> = wn
        .iter()
        .map(|&w| 2.0 * DESIGN_FS * (PI * w / DESIGN_FS).tan())
        .collect();

    let analog = match spec.band_type {
        BandType::Lowpass => lowpass_to_lowpass(&prototype, warped[0]),
        BandType::Highpass => lowpass_to_highpass(&prototype, warped[0]),
        BandType::Bandpass => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lowpass_to_bandpass(&prototype, wo, bw)
        }
        BandType::Bandstop => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lowpass_to_bandstop(&prototype, wo, bw)
        }
    };

    let digital = bilinear(&analog, DESIGN_FS);
    let (numerator, denominator) = zpk_to_transfer_function(&digital);

    log::debug!(
        "Designed {:?} {:?} IIR: order {}, {} numerator / {} denominator coefficients",
        family,
        spec.band_type,
        order,
        numerator.len(),
        denominator.len()
    );

    Ok(FilterCoefficients::Iir {
        numerator,
        denominator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::design::magnitude_at;

    fn coefficients(spec: &FilterSpec) -> (Vec<f64>, Vec<f64>) {
        match design_iir(spec).unwrap() {
            FilterCoefficients::Iir {
                numerator,
                denominator,
            } => (numerator, denominator),
            FilterCoefficients::Fir { .. } => panic!("expected IIR coefficients"),
        }
    }

    fn gain_db(b: &[f64], a: &[f64], freq_hz: f64, sample_rate: f64) -> f64 {
        20.0 * magnitude_at(b, a, freq_hz, sample_rate).log10()
    }

    #[test]
    fn test_butterworth_lowpass_reference() {
        // 2nd order, cutoff at fs/4
        let spec = FilterSpec::iir(8000, BandType::Lowpass, vec![2000.0], 2, FilterFamily::Butterworth);
        let (b, a) = coefficients(&spec);

        let expected_b = [0.292_893_218_813_452_5, 0.585_786_437_626_905, 0.292_893_218_813_452_5];
        let expected_a = [1.0, 0.0, 0.171_572_875_253_809_9];
        for (got, want) in b.iter().zip(expected_b.iter()) {
            assert!((got - want).abs() < 1e-12, "b: {got} vs {want}");
        }
        for (got, want) in a.iter().zip(expected_a.iter()) {
            assert!((got - want).abs() < 1e-12, "a: {got} vs {want}");
        }
    }

    #[test]
    fn test_butterworth_half_power_at_cutoff() {
        let spec = FilterSpec::iir(8000, BandType::Lowpass, vec![500.0], 4, FilterFamily::Butterworth);
        let (b, a) = coefficients(&spec);

        assert_eq!(b.len(), 5);
        assert_eq!(a.len(), 5);
        assert!(gain_db(&b, &a, 0.0, 8000.0).abs() < 1e-9);
        assert!((gain_db(&b, &a, 500.0, 8000.0) + 3.0103).abs() < 1e-3);
        assert!(gain_db(&b, &a, 2000.0, 8000.0) < -40.0);
    }

    #[test]
    fn test_highpass_and_bandstop_shapes() {
        let hp = FilterSpec::iir(8000, BandType::Highpass, vec![1000.0], 3, FilterFamily::Butterworth);
        let (b, a) = coefficients(&hp);
        assert!(gain_db(&b, &a, 100.0, 8000.0) < -40.0);
        assert!(gain_db(&b, &a, 3900.0, 8000.0).abs() < 0.01);

        let bs = FilterSpec::iir(8000, BandType::Bandstop, vec![900.0, 1100.0], 2, FilterFamily::Butterworth);
        let (b, a) = coefficients(&bs);
        assert_eq!(a.len(), 5);
        assert!(gain_db(&b, &a, 999.0, 8000.0) < -30.0);
        assert!(gain_db(&b, &a, 0.0, 8000.0).abs() < 1e-9);
        assert!(gain_db(&b, &a, 3000.0, 8000.0).abs() < 0.1);
    }

    #[test]
    fn test_bandpass_doubles_order() {
        let spec = FilterSpec::iir(16000, BandType::Bandpass, vec![1000.0, 2000.0], 3, FilterFamily::Butterworth);
        let (b, a) = coefficients(&spec);
        assert_eq!(a.len(), 7);
        assert_eq!(b.len(), 7);

        let centre = (1000.0f64 * 2000.0).sqrt();
        assert!(gain_db(&b, &a, centre, 16000.0).abs() < 0.05);
        assert!((gain_db(&b, &a, 1000.0, 16000.0) + 3.0103).abs() < 1e-3);
        assert!((gain_db(&b, &a, 2000.0, 16000.0) + 3.0103).abs() < 1e-3);
    }

    #[test]
    fn test_chebyshev1_ripple_at_edge() {
        let spec = FilterSpec::iir(8000, BandType::Lowpass, vec![1000.0], 4, FilterFamily::Chebyshev1)
            .with_tolerances(2.0, 40.0);
        let (b, a) = coefficients(&spec);

        // Passband edge sits at exactly -rp
        assert!((gain_db(&b, &a, 1000.0, 8000.0) + 2.0).abs() < 1e-6);
        // Even order starts at the bottom of the ripple
        assert!((gain_db(&b, &a, 0.0, 8000.0) + 2.0).abs() < 1e-6);
        for f in [100.0, 300.0, 600.0, 900.0] {
            let g = gain_db(&b, &a, f, 8000.0);
            assert!(g <= 1e-9 && g >= -2.0 - 1e-9, "{f} Hz: {g} dB");
        }
    }

    #[test]
    fn test_chebyshev2_stopband_edge() {
        let spec = FilterSpec::iir(8000, BandType::Lowpass, vec![1000.0], 5, FilterFamily::Chebyshev2)
            .with_tolerances(1.0, 50.0);
        let (b, a) = coefficients(&spec);

        assert!(gain_db(&b, &a, 0.0, 8000.0).abs() < 1e-9);
        assert!((gain_db(&b, &a, 1000.0, 8000.0) + 50.0).abs() < 1e-6);
        for f in [1200.0, 2000.0, 3000.0, 3900.0] {
            assert!(gain_db(&b, &a, f, 8000.0) <= -50.0 + 1e-6);
        }
    }

    #[test]
    fn test_elliptic_both_ripples() {
        // Stopband edge moves in as the order grows
        for (order, stopband) in [(3usize, [2900.0, 3000.0, 3500.0, 3999.0]), (4, [2500.0, 3000.0, 3500.0, 3999.0])] {
            let spec = FilterSpec::iir(8000, BandType::Lowpass, vec![1000.0], order, FilterFamily::Elliptic)
                .with_tolerances(1.0, 60.0);
            let (b, a) = coefficients(&spec);

            assert!((gain_db(&b, &a, 1000.0, 8000.0) + 1.0).abs() < 1e-6, "order {order}");
            for f in [0.0, 250.0, 500.0, 750.0] {
                let g = gain_db(&b, &a, f, 8000.0);
                assert!(g <= 1e-6 && g >= -1.0 - 1e-6, "order {order}, {f} Hz: {g} dB");
            }
            for f in stopband {
                assert!(gain_db(&b, &a, f, 8000.0) <= -60.0 + 1e-6, "order {order}, {f} Hz");
            }
        }
    }

    #[test]
    fn test_elliptic_order_one() {
        let spec = FilterSpec::iir(8000, BandType::Lowpass, vec![1000.0], 1, FilterFamily::Elliptic)
            .with_tolerances(3.0, 40.0);
        let (b, a) = coefficients(&spec);
        assert_eq!(a.len(), 2);
        assert!((gain_db(&b, &a, 1000.0, 8000.0) + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_bessel_prototype_poles() {
        // θ2(s) = s² + 3s + 3, scaled by sqrt(3)
        let zpk = bessel_prototype(2).unwrap();
        let expected = Complex64::new(-1.5, 3.0f64.sqrt() / 2.0) / 3.0f64.sqrt();
        assert!(zpk
            .poles
            .iter()
            .any(|p| (p - expected).norm() < 1e-12));
        assert!((product_of_negated(&zpk.poles).re - 1.0).abs() < 1e-12);

        for order in 1..=10 {
            let zpk = bessel_prototype(order).unwrap();
            assert_eq!(zpk.poles.len(), order);
            assert!(zpk.poles.iter().all(|p| p.re < 0.0));
            assert!((product_of_negated(&zpk.poles).re - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_high_order_bessel_prototype() {
        for order in 20..=30 {
            let zpk = bessel_prototype(order).unwrap();
            assert_eq!(zpk.poles.len(), order);
            assert!(zpk.poles.iter().all(|p| p.re < 0.0));

            let product = product_of_negated(&zpk.poles);
            assert!((product - 1.0).norm() < 1e-9, "order {}: product {}", order, product);

            for p in &zpk.poles {
                assert!(zpk.poles.iter().any(|q| (q - p.conj()).norm() < 1e-12));
            }
        }

        let spec = FilterSpec::iir(44100, BandType::Lowpass, vec![2000.0], 28, FilterFamily::Bessel);
        assert!(design_iir(&spec).is_ok());
    }

    #[test]
    fn test_bessel_ignores_ripple_parameters() {
        let base = FilterSpec::iir(8000, BandType::Lowpass, vec![800.0], 4, FilterFamily::Bessel);
        let (b1, a1) = coefficients(&base);
        let (b2, a2) = coefficients(&base.clone().with_tolerances(-5.0, 0.0));
        assert_eq!(b1, b2);
        assert_eq!(a1, a2);
        assert!(gain_db(&b1, &a1, 0.0, 8000.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_specs() {
        let zero_order = FilterSpec::iir(8000, BandType::Lowpass, vec![500.0], 0, FilterFamily::Butterworth);
        assert!(matches!(design_iir(&zero_order), Err(EngineError::InvalidSpec(_))));

        let reversed = FilterSpec::iir(8000, BandType::Bandpass, vec![1000.0, 500.0], 4, FilterFamily::Butterworth);
        assert!(matches!(design_iir(&reversed), Err(EngineError::InvalidSpec(_))));

        let no_ripple = FilterSpec::iir(8000, BandType::Lowpass, vec![500.0], 4, FilterFamily::Chebyshev1)
            .with_tolerances(0.0, 40.0);
        assert!(matches!(design_iir(&no_ripple), Err(EngineError::InvalidSpec(_))));

        let inverted = FilterSpec::iir(8000, BandType::Lowpass, vec![500.0], 4, FilterFamily::Elliptic)
            .with_tolerances(10.0, 5.0);
        assert!(matches!(design_iir(&inverted), Err(EngineError::InvalidSpec(_))));
    }
}
