//! Deafield - voice memo frequency trend analyzer
//!
//! This library reduces a finalized voice memo to a mean-amplitude
//! "frequency" estimate over two prefix windows, classifies the trend
//! between them, and drives haptic feedback from the result.

pub mod analysis;
pub mod config;
pub mod error;
pub mod feedback;
pub mod model;
pub mod scheduler;

pub use analysis::{SymphoniaSource, TrendAnalyzer};
pub use config::{AnalysisConfig, AppConfig};
pub use scheduler::{AnalysisEvent, AnalysisScheduler, Trigger};
