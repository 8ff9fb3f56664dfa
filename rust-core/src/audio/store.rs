//! Per-session signal storage
//!
//! Holds the decoded original and the latest processed result. A new
//! processed buffer replaces the previous one only once it has been
//! computed successfully; failures leave both slots untouched.

use super::buffer::AudioBuffer;
use super::codec::{self, AudioFormat};
use crate::error::{EngineError, Result};
use crate::filters::{design, FilterApplier, FilterCoefficients, FilterSpec};
use crate::spectrum::{SpectralAnalyzer, Spectrum};
use std::path::Path;

/// Which stored buffer an operation reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Original,
    Processed,
}

/// Spectrum tagged with the buffer it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumResult {
    pub source: SignalSource,
    pub spectrum: Spectrum,
}

/// Original and most recently processed buffers of one session
#[derive(Debug, Clone)]
pub struct SignalStore {
    original: AudioBuffer,
    processed: Option<AudioBuffer>,
    applier: FilterApplier,
    analyzer: SpectralAnalyzer,
}

impl SignalStore {
    /// Start a session from an in-memory buffer
    pub fn new(original: AudioBuffer) -> Self {
        Self {
            original,
            processed: None,
            applier: FilterApplier::default(),
            analyzer: SpectralAnalyzer::default(),
        }
    }

    /// Start a session from a decoded file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(codec::decode(path)?))
    }

    /// Use a custom filter applier (FFT threshold)
    pub fn with_applier(mut self, applier: FilterApplier) -> Self {
        self.applier = applier;
        self
    }

    /// Use a custom analyzer (analysis window)
    pub fn with_analyzer(mut self, analyzer: SpectralAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn original(&self) -> &AudioBuffer {
        &self.original
    }

    pub fn processed(&self) -> Option<&AudioBuffer> {
        self.processed.as_ref()
    }

    /// Stored buffer for `source`
    pub fn signal(&self, source: SignalSource) -> Result<&AudioBuffer> {
        match source {
            SignalSource::Original => Ok(&self.original),
            SignalSource::Processed => self.processed.as_ref().ok_or(EngineError::NoProcessedSignal),
        }
    }

    /// Design a filter and apply it to the original
    pub fn apply_filter(&mut self, spec: &FilterSpec, zero_phase: bool) -> Result<&AudioBuffer> {
        if spec.sample_rate != self.original.sample_rate() {
            return Err(EngineError::invalid_spec(format!(
                "filter designed for {} Hz but the signal is {} Hz",
                spec.sample_rate,
                self.original.sample_rate()
            )));
        }
        let coefficients = design(spec)?;
        self.apply_coefficients(&coefficients, zero_phase)
    }

    /// Apply already designed coefficients to the original
    pub fn apply_coefficients(
        &mut self,
        coefficients: &FilterCoefficients,
        zero_phase: bool,
    ) -> Result<&AudioBuffer> {
        let result = self.applier.apply(&self.original, coefficients, zero_phase)?;
        Ok(self.processed.insert(result))
    }

    /// Forward transform of either stored buffer
    pub fn transform(&self, source: SignalSource) -> Result<SpectrumResult> {
        let spectrum = self.analyzer.forward_transform(self.signal(source)?)?;
        Ok(SpectrumResult { source, spectrum })
    }

    /// Notch-filter a stored buffer; the result becomes the processed signal
    pub fn notch_remove(&mut self, source: SignalSource, low_hz: f64, high_hz: f64) -> Result<&AudioBuffer> {
        let result = self.analyzer.notch_remove(self.signal(source)?, low_hz, high_hz)?;
        Ok(self.processed.insert(result))
    }

    /// Encode the processed signal
    pub fn save(&self, path: impl AsRef<Path>, format: AudioFormat) -> Result<()> {
        codec::encode(self.signal(SignalSource::Processed)?, path, format)
    }

    /// Store a result computed elsewhere (background worker)
    pub(crate) fn set_processed(&mut self, processed: AudioBuffer) {
        self.processed = Some(processed);
    }

    /// Drop the processed signal, keeping the original
    pub fn clear_processed(&mut self) {
        self.processed = None;
    }
}
