//! FFT-based fast convolution for long FIR filters
//!
//! Overlap-add with frequency-domain multiplication.
//! Complexity: O(N log M) vs O(N*M) for time-domain

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// FFT-based FIR filter for long impulse responses
pub struct FastFirFilter {
    /// Filter coefficients in frequency domain
    h_fft: Vec<Complex<f64>>,

    /// FFT size (power of 2, >= block_size + filter_length - 1)
    fft_size: usize,

    /// Input samples consumed per FFT
    block_size: usize,

    filter_length: usize,

    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,
}

impl FastFirFilter {
    /// Create new FFT-based filter
    ///
    /// # Arguments
    /// * `coefficients` - Filter coefficients h[n]
    /// * `block_size` - Input block size (e.g., 1024)
    ///
    /// # Note
    /// FFT size is chosen as next power of 2 >= (block_size + filter_length - 1)
    pub fn new(coefficients: &[f64], block_size: usize) -> Self {
        let filter_length = coefficients.len().max(1);
        let block_size = block_size.max(1);
        let fft_size = (block_size + filter_length - 1).next_power_of_two();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);

        let mut h_fft = vec![Complex::new(0.0, 0.0); fft_size];
        for (slot, &coeff) in h_fft.iter_mut().zip(coefficients) {
            *slot = Complex::new(coeff, 0.0);
        }
        fft.process(&mut h_fft);

        Self {
            h_fft,
            fft_size,
            block_size,
            filter_length,
            fft,
            ifft,
        }
    }

    /// Causal convolution of a whole buffer, truncated to the input length
    ///
    /// Each block's full linear-convolution result, tail included, is
    /// accumulated into the output so tails spanning several blocks survive.
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; input.len()];
        let mut buffer = vec![Complex::new(0.0, 0.0); self.fft_size];
        let scale = 1.0 / self.fft_size as f64;

        for (block_index, block) in input.chunks(self.block_size).enumerate() {
            let start = block_index * self.block_size;

            // 1. Zero-padded block
            buffer.fill(Complex::new(0.0, 0.0));
            for (slot, &x) in buffer.iter_mut().zip(block) {
                *slot = Complex::new(x, 0.0);
            }

            // 2. Multiply spectra
            self.fft.process(&mut buffer);
            for (x, h) in buffer.iter_mut().zip(&self.h_fft) {
                *x *= *h;
            }
            self.ifft.process(&mut buffer);

            // 3. Overlap-add into the output
            let produced = block.len() + self.filter_length - 1;
            let end = (start + produced).min(output.len());
            for (y, value) in output[start..end].iter_mut().zip(&buffer) {
                *y += value.re * scale;
            }
        }

        output
    }
}
