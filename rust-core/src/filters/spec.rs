//! Filter specifications and designed coefficients

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Which part of the spectrum the filter passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl BandType {
    /// Number of cutoff frequencies this band type needs
    pub fn cutoff_count(&self) -> usize {
        match self {
            BandType::Lowpass | BandType::Highpass => 1,
            BandType::Bandpass | BandType::Bandstop => 2,
        }
    }
}

impl std::str::FromStr for BandType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lowpass" | "low" => Ok(BandType::Lowpass),
            "highpass" | "high" => Ok(BandType::Highpass),
            "bandpass" | "band" => Ok(BandType::Bandpass),
            "bandstop" | "stop" => Ok(BandType::Bandstop),
            other => Err(EngineError::invalid_spec(format!("unknown band type '{other}'"))),
        }
    }
}

/// Analog prototype used for IIR design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterFamily {
    /// Maximally flat passband
    Butterworth,
    /// Equiripple passband
    Chebyshev1,
    /// Equiripple stopband
    Chebyshev2,
    /// Equiripple passband and stopband
    Elliptic,
    /// Maximally flat group delay
    Bessel,
}

impl FilterFamily {
    /// Whether the passband ripple tolerance is used by this family
    pub fn uses_passband_ripple(&self) -> bool {
        matches!(self, FilterFamily::Chebyshev1 | FilterFamily::Elliptic)
    }

    /// Whether the stopband attenuation tolerance is used by this family
    pub fn uses_stopband_attenuation(&self) -> bool {
        matches!(self, FilterFamily::Chebyshev2 | FilterFamily::Elliptic)
    }
}

impl std::str::FromStr for FilterFamily {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "butterworth" | "butter" => Ok(FilterFamily::Butterworth),
            "chebyshev1" | "cheby1" => Ok(FilterFamily::Chebyshev1),
            "chebyshev2" | "cheby2" => Ok(FilterFamily::Chebyshev2),
            "elliptic" | "ellip" => Ok(FilterFamily::Elliptic),
            "bessel" => Ok(FilterFamily::Bessel),
            other => Err(EngineError::invalid_spec(format!("unknown filter family '{other}'"))),
        }
    }
}

/// Design method and its method-specific parameters
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Iir {
        order: usize,
        family: FilterFamily,
        /// Chebyshev I / elliptic passband ripple (dB)
        passband_ripple_db: f64,
        /// Chebyshev II / elliptic stopband attenuation (dB)
        stopband_attenuation_db: f64,
    },
    Fir {
        /// Kaiser design target attenuation (dB)
        stopband_attenuation_db: f64,
        /// Width of the transition band (Hz)
        transition_width_hz: f64,
    },
}

/// Complete description of a filter to design
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Sample rate the cutoffs refer to (Hz)
    pub sample_rate: u32,

    pub band_type: BandType,

    /// One cutoff for lowpass/highpass, two (low < high) for bandpass/bandstop (Hz)
    pub cutoffs: Vec<f64>,

    pub kind: FilterKind,
}

impl FilterSpec {
    /// IIR spec with 1 dB passband ripple and 40 dB stopband attenuation
    pub fn iir(
        sample_rate: u32,
        band_type: BandType,
        cutoffs: Vec<f64>,
        order: usize,
        family: FilterFamily,
    ) -> Self {
        Self {
            sample_rate,
            band_type,
            cutoffs,
            kind: FilterKind::Iir {
                order,
                family,
                passband_ripple_db: 1.0,
                stopband_attenuation_db: 40.0,
            },
        }
    }

    /// Kaiser-window FIR spec
    pub fn fir(
        sample_rate: u32,
        band_type: BandType,
        cutoffs: Vec<f64>,
        stopband_attenuation_db: f64,
        transition_width_hz: f64,
    ) -> Self {
        Self {
            sample_rate,
            band_type,
            cutoffs,
            kind: FilterKind::Fir {
                stopband_attenuation_db,
                transition_width_hz,
            },
        }
    }

    /// Override the IIR tolerance parameters (no effect on FIR specs)
    pub fn with_tolerances(mut self, passband_ripple_db: f64, stopband_attenuation_db: f64) -> Self {
        if let FilterKind::Iir {
            passband_ripple_db: rp,
            stopband_attenuation_db: rs,
            ..
        } = &mut self.kind
        {
            *rp = passband_ripple_db;
            *rs = stopband_attenuation_db;
        }
        self
    }

    /// Nyquist frequency (Hz)
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }

    /// Cutoffs normalized against Nyquist, checked against the band type
    pub fn normalized_cutoffs(&self) -> Result<Vec<f64>> {
        if self.sample_rate == 0 {
            return Err(EngineError::invalid_spec("sample rate must be positive"));
        }

        let expected = self.band_type.cutoff_count();
        if self.cutoffs.len() != expected {
            return Err(EngineError::invalid_spec(format!(
                "{:?} needs {} cutoff frequency(ies), got {}",
                self.band_type,
                expected,
                self.cutoffs.len()
            )));
        }

        let nyquist = self.nyquist();
        for &f in &self.cutoffs {
            if !(f.is_finite() && f > 0.0 && f < nyquist) {
                return Err(EngineError::invalid_spec(format!(
                    "cutoff {f} Hz must lie strictly inside (0, {nyquist}) Hz"
                )));
            }
        }

        if expected == 2 && self.cutoffs[0] >= self.cutoffs[1] {
            return Err(EngineError::invalid_spec(format!(
                "band edges must satisfy low < high, got [{}, {}]",
                self.cutoffs[0], self.cutoffs[1]
            )));
        }

        Ok(self.cutoffs.iter().map(|&f| f / nyquist).collect())
    }
}

/// Designed filter, ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCoefficients {
    /// Rational transfer function b(z)/a(z)
    Iir {
        numerator: Vec<f64>,
        denominator: Vec<f64>,
    },
    /// Impulse response
    Fir { taps: Vec<f64> },
}

impl FilterCoefficients {
    /// Numerator polynomial (the taps for FIR)
    pub fn numerator(&self) -> &[f64] {
        match self {
            FilterCoefficients::Iir { numerator, .. } => numerator,
            FilterCoefficients::Fir { taps } => taps,
        }
    }

    /// Denominator polynomial (`[1.0]` for FIR)
    pub fn denominator(&self) -> &[f64] {
        match self {
            FilterCoefficients::Iir { denominator, .. } => denominator,
            FilterCoefficients::Fir { .. } => &[1.0],
        }
    }

    /// Constant delay of a linear-phase FIR, `(N-1)/2` samples
    pub fn group_delay_samples(&self) -> Option<f64> {
        match self {
            FilterCoefficients::Iir { .. } => None,
            FilterCoefficients::Fir { taps } => Some(taps.len().saturating_sub(1) as f64 / 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_cutoffs() {
        let spec = FilterSpec::iir(8000, BandType::Bandpass, vec![500.0, 1000.0], 4, FilterFamily::Butterworth);
        let wn = spec.normalized_cutoffs().unwrap();
        assert!((wn[0] - 0.125).abs() < 1e-12);
        assert!((wn[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_band_edges_rejected() {
        let spec = FilterSpec::iir(8000, BandType::Bandpass, vec![1000.0, 500.0], 4, FilterFamily::Butterworth);
        assert!(matches!(spec.normalized_cutoffs(), Err(EngineError::InvalidSpec(_))));
    }

    #[test]
    fn test_cutoff_count_and_range() {
        let two_for_lowpass = FilterSpec::iir(8000, BandType::Lowpass, vec![100.0, 200.0], 2, FilterFamily::Bessel);
        assert!(two_for_lowpass.normalized_cutoffs().is_err());

        let at_nyquist = FilterSpec::iir(8000, BandType::Highpass, vec![4000.0], 2, FilterFamily::Bessel);
        assert!(at_nyquist.normalized_cutoffs().is_err());

        let zero = FilterSpec::fir(8000, BandType::Lowpass, vec![0.0], 60.0, 50.0);
        assert!(zero.normalized_cutoffs().is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("cheby1".parse::<FilterFamily>().unwrap(), FilterFamily::Chebyshev1);
        assert_eq!("ELLIP".parse::<FilterFamily>().unwrap(), FilterFamily::Elliptic);
        assert_eq!("bandstop".parse::<BandType>().unwrap(), BandType::Bandstop);
        assert!("notch".parse::<BandType>().is_err());
    }

    #[test]
    fn test_fir_group_delay() {
        let coeffs = FilterCoefficients::Fir { taps: vec![0.25, 0.5, 0.25] };
        assert_eq!(coeffs.group_delay_samples(), Some(1.0));
        assert_eq!(coeffs.denominator(), &[1.0]);
    }
}
