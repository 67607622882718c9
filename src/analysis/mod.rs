//! Audio analysis layer
//!
//! Decoded samples come in through a [`SampleSource`], get reduced to two
//! windowed estimates, and leave as a [`TrendReading`](crate::model::TrendReading)
//! plus a feedback dispatch.

mod analyzer;
mod decode;
pub mod estimator;
mod traits;
pub mod trend;

pub use analyzer::TrendAnalyzer;
pub use decode::{decode_first_channel, SymphoniaSource};
pub use estimator::estimate;
pub use traits::{MemorySource, SampleSource};
pub use trend::{classify, map_feedback};
