use super::pattern::HapticPattern;
use crate::model::FeedbackParams;
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Consumer of feedback parameters (haptic engine, notifier, ...)
pub trait FeedbackSink {
    /// Play feedback for one successful analysis
    fn dispatch(&self, params: FeedbackParams) -> Result<()>;
}

impl<F: FeedbackSink + ?Sized> FeedbackSink for Arc<F> {
    fn dispatch(&self, params: FeedbackParams) -> Result<()> {
        (**self).dispatch(params)
    }
}

impl<F: FeedbackSink + ?Sized> FeedbackSink for Box<F> {
    fn dispatch(&self, params: FeedbackParams) -> Result<()> {
        (**self).dispatch(params)
    }
}

/// Reports feedback through the log facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl FeedbackSink for LogSink {
    fn dispatch(&self, params: FeedbackParams) -> Result<()> {
        log::info!(
            "Haptic feedback: transient intensity={:.2} sharpness={:.2}",
            params.intensity,
            params.sharpness
        );
        Ok(())
    }
}

/// Writes each haptic pattern as one JSON line
pub struct JsonLinesSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer, e.g. to inspect a buffer
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write> FeedbackSink for JsonLinesSink<W> {
    fn dispatch(&self, params: FeedbackParams) -> Result<()> {
        let pattern = HapticPattern::transient(params);
        let line = serde_json::to_string(&pattern).context("Failed to encode haptic pattern")?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("Feedback writer lock poisoned"))?;
        writeln!(writer, "{}", line).context("Failed to write haptic pattern")?;
        writer.flush().context("Failed to flush haptic pattern")?;
        Ok(())
    }
}

/// Keeps every dispatched value; cloned handles share the same list
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    dispatched: Arc<Mutex<Vec<FeedbackParams>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, oldest first
    pub fn dispatched(&self) -> Vec<FeedbackParams> {
        self.dispatched
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }

    pub fn count(&self) -> usize {
        self.dispatched().len()
    }
}

impl FeedbackSink for CollectingSink {
    fn dispatch(&self, params: FeedbackParams) -> Result<()> {
        self.dispatched
            .lock()
            .map_err(|_| anyhow::anyhow!("Collecting sink lock poisoned"))?
            .push(params);
        Ok(())
    }
}
