//! Immutable mono sample buffer
//!
//! Every engine stage consumes a buffer and produces a new one; nothing
//! mutates samples in place.

use crate::error::{EngineError, Result};

/// Mono audio at a fixed sample rate, samples normalized to [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    samples: Vec<f64>,
}

impl AudioBuffer {
    /// Create a buffer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz, must be positive
    /// * `samples` - Normalized samples
    pub fn new(sample_rate: u32, samples: Vec<f64>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(EngineError::invalid_spec("sample rate must be positive"));
        }
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    /// New buffer at the same sample rate
    pub(crate) fn with_samples(&self, samples: Vec<f64>) -> Self {
        Self {
            sample_rate: self.sample_rate,
            samples,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Time of each sample in seconds
    pub fn time_axis(&self) -> Vec<f64> {
        let dt = 1.0 / self.sample_rate as f64;
        (0..self.samples.len()).map(|i| i as f64 * dt).collect()
    }

    /// Largest absolute sample value (0 for an empty buffer)
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |acc, &x| acc.max(x.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_accessors() {
        let buffer = AudioBuffer::new(8000, vec![0.0, 0.5, -0.75, 0.25]).unwrap();
        assert_eq!(buffer.sample_rate(), 8000);
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.is_empty());
        assert!((buffer.peak() - 0.75).abs() < 1e-15);
        assert!((buffer.duration_seconds() - 0.0005).abs() < 1e-15);
    }

    #[test]
    fn test_duration_matches_length() {
        let buffer = AudioBuffer::new(44100, vec![0.0; 44100 * 2]).unwrap();
        assert!((buffer.duration_seconds() - 2.0).abs() < 1e-12);
        let rebuilt = (buffer.duration_seconds() * buffer.sample_rate() as f64).round() as usize;
        assert_eq!(rebuilt, buffer.len());
    }

    #[test]
    fn test_time_axis() {
        let buffer = AudioBuffer::new(4, vec![0.0; 4]).unwrap();
        assert_eq!(buffer.time_axis(), vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(matches!(
            AudioBuffer::new(0, vec![0.0]),
            Err(EngineError::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = AudioBuffer::new(8000, Vec::new()).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.peak(), 0.0);
        assert!(buffer.time_axis().is_empty());
    }
}
