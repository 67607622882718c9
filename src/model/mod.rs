//! Data model shared by the analysis core, the scheduler and the CLI
//!
//! Everything here is transient: buffers, readings and feedback values
//! are created per analysis call and never persisted.

mod library;
mod samples;
mod trend;

pub use library::{FinalizedRecording, MemoLibrary};
pub use samples::{SampleBuffer, WindowSpec};
pub use trend::{FeedbackParams, Trend, TrendReading};
