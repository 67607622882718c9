//! Windowed "frequency" estimate
//!
//! The estimate is the arithmetic mean of the raw amplitudes in a prefix
//! window. It is not spectrally derived; larger simply means higher.

use crate::model::WindowSpec;

/// Mean amplitude over the first `duration_secs` of `signal`.
///
/// The window always starts at sample 0 and silently shrinks to the whole
/// buffer when it would run past the end. Returns `None` when the window
/// holds no samples.
pub fn estimate(signal: &[f64], sample_rate: f64, duration_secs: f64) -> Option<f64> {
    estimate_window(signal, sample_rate, WindowSpec::new(duration_secs))
}

/// Same as [`estimate`], taking a [`WindowSpec`]
pub fn estimate_window(signal: &[f64], sample_rate: f64, window: WindowSpec) -> Option<f64> {
    let count = window.sample_count(sample_rate, signal.len());
    if count == 0 {
        return None;
    }

    let sum: f64 = signal[..count].iter().sum();
    Some(sum / count as f64)
}
