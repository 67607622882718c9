use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the estimate between the early and later window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Later estimate strictly above the early one
    Rising,
    /// Later estimate below or equal to the early one
    FallingOrEqual,
}

impl Trend {
    pub fn name(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::FallingOrEqual => "falling/equal",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Haptic feedback parameters, both in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackParams {
    pub intensity: f32,
    pub sharpness: f32,
}

impl FeedbackParams {
    pub const fn new(intensity: f32, sharpness: f32) -> Self {
        Self {
            intensity,
            sharpness,
        }
    }
}

/// Result of one successful trend analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    /// Mean amplitude over the early window (the published "frequency")
    pub early_estimate: f64,

    /// Mean amplitude over the later window
    pub later_estimate: f64,

    pub trend: Trend,

    pub feedback: FeedbackParams,
}

impl TrendReading {
    /// The value shown to observers
    pub fn frequency(&self) -> f64 {
        self.early_estimate
    }
}
