//! Feedback output layer
//!
//! The analyzer only produces (intensity, sharpness). Sinks decide what
//! that means: a log line, a JSON haptic pattern for an actuator process,
//! or an in-memory record for tests and embedding applications.

mod pattern;
mod sinks;

pub use pattern::{HapticEvent, HapticEventKind, HapticPattern, NotificationKind};
pub use sinks::{CollectingSink, FeedbackSink, JsonLinesSink, LogSink};
