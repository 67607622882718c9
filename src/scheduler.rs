//! Periodic and on-demand analysis worker
//!
//! One background thread owns the timer. Every tick it analyzes the most
//! recently finalized memo; requests from the user are routed through the
//! same thread, so the two paths never overlap. Readings leave through a
//! channel as [`AnalysisEvent`]s.

use crate::analysis::{SampleSource, TrendAnalyzer};
use crate::error::SchedulerError;
use crate::feedback::FeedbackSink;
use crate::model::{MemoLibrary, TrendReading};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// What caused an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Periodic,
    OnDemand,
}

/// Published after every successful analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisEvent {
    pub trigger: Trigger,
    pub recording: PathBuf,
    pub reading: TrendReading,
    /// Replacement for the observer's frequency list (always one element)
    pub frequencies: Vec<f64>,
    pub analyzed_at: DateTime<Local>,
}

enum Command {
    Analyze(PathBuf),
    Stop,
}

struct Worker {
    commands: Sender<Command>,
    handle: JoinHandle<()>,
}

/// Owns the analysis timer and its worker thread
pub struct AnalysisScheduler<S, F>
where
    S: SampleSource + Send + Sync + 'static,
    F: FeedbackSink + Send + Sync + 'static,
{
    analyzer: Arc<TrendAnalyzer<S, F>>,
    library: Arc<Mutex<MemoLibrary>>,
    interval: Duration,
    worker: Option<Worker>,
}

impl<S, F> AnalysisScheduler<S, F>
where
    S: SampleSource + Send + Sync + 'static,
    F: FeedbackSink + Send + Sync + 'static,
{
    pub fn new(
        analyzer: Arc<TrendAnalyzer<S, F>>,
        library: Arc<Mutex<MemoLibrary>>,
        interval: Duration,
    ) -> Self {
        Self {
            analyzer,
            library,
            interval,
            worker: None,
        }
    }

    /// Start the worker and return the event stream.
    ///
    /// The first periodic analysis happens one interval after start.
    pub fn start(&mut self) -> Result<Receiver<AnalysisEvent>, SchedulerError> {
        if self.worker.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let context = WorkerContext {
            analyzer: Arc::clone(&self.analyzer),
            library: Arc::clone(&self.library),
            interval: self.interval,
            events: event_tx,
        };

        let handle = std::thread::Builder::new()
            .name("deafield-analysis".into())
            .spawn(move || context.run(command_rx))
            .map_err(SchedulerError::Spawn)?;

        log::info!("Analysis scheduler started (interval {:?})", self.interval);

        self.worker = Some(Worker {
            commands: command_tx,
            handle,
        });
        Ok(event_rx)
    }

    /// Queue an analysis of `path` on the worker
    pub fn request(&self, path: impl Into<PathBuf>) -> Result<(), SchedulerError> {
        let worker = self.worker.as_ref().ok_or(SchedulerError::NotRunning)?;
        worker
            .commands
            .send(Command::Analyze(path.into()))
            .map_err(|_| SchedulerError::NotRunning)
    }

    /// Stop the worker and wait for it.
    ///
    /// An analysis already in progress finishes first. Calling this on a
    /// stopped scheduler does nothing.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // A dead worker has already dropped its receiver
        let _ = worker.commands.send(Command::Stop);
        if worker.handle.join().is_err() {
            log::error!("Analysis worker panicked");
        }
        log::info!("Analysis scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn analyzer(&self) -> &Arc<TrendAnalyzer<S, F>> {
        &self.analyzer
    }
}

impl<S, F> Drop for AnalysisScheduler<S, F>
where
    S: SampleSource + Send + Sync + 'static,
    F: FeedbackSink + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

struct WorkerContext<S: SampleSource, F: FeedbackSink> {
    analyzer: Arc<TrendAnalyzer<S, F>>,
    library: Arc<Mutex<MemoLibrary>>,
    interval: Duration,
    events: Sender<AnalysisEvent>,
}

impl<S: SampleSource, F: FeedbackSink> WorkerContext<S, F> {
    fn run(self, commands: Receiver<Command>) {
        let mut next_tick = Instant::now() + self.interval;

        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            match commands.recv_timeout(timeout) {
                Ok(Command::Analyze(path)) => self.analyze(Trigger::OnDemand, path),
                Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    self.tick();

                    // Skip ticks missed during a slow analysis
                    next_tick += self.interval;
                    let now = Instant::now();
                    if next_tick <= now {
                        next_tick = now + self.interval;
                    }
                }
            }
        }

        log::debug!("Analysis worker exiting");
    }

    fn tick(&self) {
        let latest = {
            let mut library = self.library.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = library.refresh() {
                log::warn!("Failed to refresh memo library: {:#}", e);
            }
            library.latest().map(|r| r.path.clone())
        };

        match latest {
            Some(path) => self.analyze(Trigger::Periodic, path),
            None => log::debug!("No finalized recordings to analyze"),
        }
    }

    fn analyze(&self, trigger: Trigger, path: PathBuf) {
        let Some(reading) = self.analyzer.analyze_file(&path) else {
            log::debug!("No analysis result for {:?}", path);
            return;
        };

        let event = AnalysisEvent {
            trigger,
            frequencies: vec![reading.frequency()],
            recording: path,
            reading,
            analyzed_at: Local::now(),
        };

        if self.events.send(event).is_err() {
            log::debug!("Event receiver dropped, reading discarded");
        }
    }
}
