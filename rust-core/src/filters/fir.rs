//! Direct-form FIR convolution
//!
//! Time-domain y[n] = Σ h[k]·x[n-k], used for short tap sets where the
//! FFT setup cost outweighs the O(N·M) inner loop.

/// FIR filter evaluated by direct convolution
#[derive(Debug, Clone)]
pub struct FirFilter {
    /// Filter coefficients h[n]
    coefficients: Vec<f64>,
}

impl FirFilter {
    /// Create a new FIR filter with given coefficients
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Causal convolution from zero initial state, truncated to the input length
    ///
    /// # Arguments
    /// * `input` - Input samples
    ///
    /// # Returns
    /// Filtered output samples (same length as input)
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; input.len()];
        for (n, y) in output.iter_mut().enumerate() {
            let taps = self.coefficients.len().min(n + 1);
            *y = self.coefficients[..taps]
                .iter()
                .enumerate()
                .map(|(k, &h)| h * input[n - k])
                .sum();
        }
        output
    }
}
