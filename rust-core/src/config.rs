//! Engine configuration loaded from TOML
//!
//! Every field has a default, so an empty document is a valid configuration.

use crate::audio::AudioFormat;
use crate::error::{EngineError, Result};
use crate::filters::FilterFamily;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Defaults used by front-ends when the user leaves a parameter out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Kaiser FIR stopband attenuation (dB)
    pub fir_attenuation_db: f64,

    /// Kaiser FIR transition width (Hz)
    pub fir_transition_width_hz: f64,

    /// IIR prototype order
    pub iir_order: usize,

    /// IIR prototype family
    pub iir_family: FilterFamily,

    /// Passband ripple for chebyshev1/elliptic (dB)
    pub passband_ripple_db: f64,

    /// Stopband attenuation for chebyshev2/elliptic (dB)
    pub stopband_attenuation_db: f64,

    /// Forward-backward IIR application
    pub zero_phase: bool,

    /// Tap count at which FIR application switches to FFT convolution
    pub fft_block_threshold: usize,

    /// Container used when the output path carries no extension
    pub output_format: AudioFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fir_attenuation_db: 65.0,
            fir_transition_width_hz: 24.0,
            iir_order: 4,
            iir_family: FilterFamily::Butterworth,
            passband_ripple_db: 1.0,
            stopband_attenuation_db: 40.0,
            zero_phase: true,
            fft_block_threshold: 64,
            output_format: AudioFormat::Wav,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.fir_attenuation_db.is_finite() && self.fir_attenuation_db > 0.0) {
            return Err(EngineError::Config(
                "fir_attenuation_db must be positive".into(),
            ));
        }
        if !(self.fir_transition_width_hz.is_finite() && self.fir_transition_width_hz > 0.0) {
            return Err(EngineError::Config(
                "fir_transition_width_hz must be positive".into(),
            ));
        }
        if self.iir_order == 0 {
            return Err(EngineError::Config("iir_order must be at least 1".into()));
        }
        if self.passband_ripple_db <= 0.0 || self.stopband_attenuation_db <= 0.0 {
            return Err(EngineError::Config(
                "ripple and attenuation must be positive".into(),
            ));
        }
        if self.fft_block_threshold == 0 {
            return Err(EngineError::Config(
                "fft_block_threshold must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
