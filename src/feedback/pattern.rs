use crate::model::FeedbackParams;
use serde::Serialize;

/// System notification played alongside the custom haptic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
}

/// Kind of haptic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticEventKind {
    /// Single short tap
    Transient,
}

/// One haptic event with its two parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HapticEvent {
    pub kind: HapticEventKind,
    pub intensity: f32,
    pub sharpness: f32,
    /// Offset from pattern start, in seconds
    pub relative_time: f64,
}

/// Payload handed to a haptic actuator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HapticPattern {
    pub notification: NotificationKind,
    pub events: Vec<HapticEvent>,
}

impl HapticPattern {
    /// Success notification followed by one transient tap at t=0
    pub fn transient(params: FeedbackParams) -> Self {
        Self {
            notification: NotificationKind::Success,
            events: vec![HapticEvent {
                kind: HapticEventKind::Transient,
                intensity: params.intensity.clamp(0.0, 1.0),
                sharpness: params.sharpness.clamp(0.0, 1.0),
                relative_time: 0.0,
            }],
        }
    }
}
