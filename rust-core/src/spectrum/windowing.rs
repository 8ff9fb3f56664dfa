//! Analysis windows applied ahead of the forward transform

use crate::filters::windows::{generate_window, WindowType};

/// Copy of `signal` multiplied point-wise by the window
pub fn apply_window(signal: &[f64], window_type: WindowType) -> Vec<f64> {
    match window_type {
        WindowType::Rectangular => signal.to_vec(),
        _ => generate_window(window_type, signal.len())
            .into_iter()
            .zip(signal)
            .map(|(w, s)| w * s)
            .collect(),
    }
}

/// Coherent gain correction: scales a windowed spectrum so a sinusoid keeps its peak height
pub fn window_correction_factor(window_type: WindowType, length: usize) -> f64 {
    let coherent_gain: f64 = generate_window(window_type, length).iter().sum();
    if coherent_gain > 0.0 {
        length as f64 / coherent_gain
    } else {
        1.0
    }
}
