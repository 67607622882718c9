//! Trend classification and the feedback lookup table

use crate::model::{FeedbackParams, Trend};

/// Feedback for a rising trend
pub const RISING_FEEDBACK: FeedbackParams = FeedbackParams::new(1.0, 1.0);

/// Feedback for a falling or flat trend
pub const FALLING_FEEDBACK: FeedbackParams = FeedbackParams::new(0.5, 0.5);

/// `Rising` iff `early < later`; ties are `FallingOrEqual`
pub fn classify(early: f64, later: f64) -> Trend {
    if early < later {
        Trend::Rising
    } else {
        Trend::FallingOrEqual
    }
}

pub fn map_feedback(trend: Trend) -> FeedbackParams {
    match trend {
        Trend::Rising => RISING_FEEDBACK,
        Trend::FallingOrEqual => FALLING_FEEDBACK,
    }
}
