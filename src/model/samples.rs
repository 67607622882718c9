use serde::{Deserialize, Serialize};

/// Decoded mono audio paired with the rate it should be interpreted at
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl SampleBuffer {
    /// Create a buffer from raw samples
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a buffer from decoder output (f32 PCM)
    pub fn from_f32(samples: &[f32], sample_rate: f64) -> Self {
        Self::new(samples.iter().map(|&s| f64::from(s)).collect(), sample_rate)
    }

    /// Same samples, interpreted at a different rate
    pub fn with_sample_rate(self, sample_rate: f64) -> Self {
        Self {
            samples: self.samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds at the buffer's sample rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f64 / self.sample_rate
        } else {
            0.0
        }
    }
}

/// A prefix window of the buffer, expressed as a duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Window length in seconds
    pub duration_secs: f64,
}

impl WindowSpec {
    pub fn new(duration_secs: f64) -> Self {
        Self { duration_secs }
    }

    /// Samples needed to cover the full window.
    ///
    /// Negative or NaN durations saturate to zero.
    pub fn required_samples(&self, sample_rate: f64) -> usize {
        (self.duration_secs * sample_rate).floor() as usize
    }

    /// Number of samples covered by this window, clamped to `available`
    pub fn sample_count(&self, sample_rate: f64, available: usize) -> usize {
        self.required_samples(sample_rate).min(available)
    }
}
