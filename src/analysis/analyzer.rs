//! Trend analysis orchestration
//!
//! Runs the estimator on the early and later prefix windows, classifies
//! the trend, maps it to feedback and publishes the result.

use super::estimator::estimate_window;
use super::traits::SampleSource;
use super::trend::{classify, map_feedback};
use crate::config::AnalysisConfig;
use crate::feedback::FeedbackSink;
use crate::model::{SampleBuffer, TrendReading};
use std::path::Path;
use std::sync::Mutex;

/// Analyzer wiring a sample source to a feedback sink
pub struct TrendAnalyzer<S: SampleSource, F: FeedbackSink> {
    source: S,
    sink: F,
    config: AnalysisConfig,
    /// Early-window estimate of the last successful analysis
    last_estimate: Mutex<Option<f64>>,
}

impl<S: SampleSource, F: FeedbackSink> TrendAnalyzer<S, F> {
    /// Create an analyzer with the default 2s/4s windows at 44.1kHz
    pub fn new(source: S, sink: F) -> Self {
        Self::with_config(source, sink, AnalysisConfig::default())
    }

    pub fn with_config(source: S, sink: F, config: AnalysisConfig) -> Self {
        Self {
            source,
            sink,
            config,
            last_estimate: Mutex::new(None),
        }
    }

    /// Compute a reading without dispatching or publishing anything.
    ///
    /// Both windows start at sample 0, so the later window contains the
    /// early one. The early window may be shorter than configured, the
    /// later one must be fully covered by the buffer.
    pub fn evaluate(&self, buffer: &SampleBuffer) -> Option<TrendReading> {
        let samples = buffer.samples();
        let rate = buffer.sample_rate();

        let Some(early) = estimate_window(samples, rate, self.config.early_window()) else {
            log::debug!("Early window is empty ({} samples), no estimate", samples.len());
            return None;
        };

        let later_window = self.config.later_window();
        let required = later_window.required_samples(rate);
        if samples.len() < required {
            log::debug!(
                "Buffer too short for the later window ({:.2}s, {} < {} samples), skipping feedback",
                buffer.duration_secs(),
                samples.len(),
                required
            );
            return None;
        }

        let Some(later) = estimate_window(samples, rate, later_window) else {
            log::debug!("Later window is empty, skipping feedback");
            return None;
        };

        let trend = classify(early, later);
        Some(TrendReading {
            early_estimate: early,
            later_estimate: later,
            trend,
            feedback: map_feedback(trend),
        })
    }

    /// Evaluate, then dispatch feedback and publish the early estimate
    pub fn analyze(&self, buffer: &SampleBuffer) -> Option<TrendReading> {
        let reading = self.evaluate(buffer)?;

        log::debug!(
            "Estimates: early={:.6} later={:.6} -> {}",
            reading.early_estimate,
            reading.later_estimate,
            reading.trend
        );

        if let Err(e) = self.sink.dispatch(reading.feedback) {
            log::warn!("Feedback dispatch failed: {:#}", e);
        }

        let mut last = self.last_estimate.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(reading.early_estimate);

        Some(reading)
    }

    /// Load a finalized recording and analyze it.
    ///
    /// Decode failures are logged and reported as no result.
    pub fn analyze_file(&self, path: &Path) -> Option<TrendReading> {
        let buffer = self.load(path)?;
        self.analyze(&buffer)
    }

    /// Load a finalized recording and evaluate it without side effects
    pub fn evaluate_file(&self, path: &Path) -> Option<TrendReading> {
        let buffer = self.load(path)?;
        self.evaluate(&buffer)
    }

    /// Published history: empty, or the last early estimate alone
    pub fn dominant_frequencies(&self) -> Vec<f64> {
        let last = self.last_estimate.lock().unwrap_or_else(|e| e.into_inner());
        last.iter().copied().collect()
    }

    fn load(&self, path: &Path) -> Option<SampleBuffer> {
        let buffer = match self.source.load(path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Error loading audio file: {}", e);
                return None;
            }
        };

        if self.config.use_decoded_rate {
            Some(buffer)
        } else {
            Some(buffer.with_sample_rate(self.config.sample_rate))
        }
    }
}
