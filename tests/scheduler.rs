mod common;

use common::{step_buffer, write_step_wav};
use deafield::analysis::{MemorySource, SampleSource, SymphoniaSource, TrendAnalyzer};
use deafield::error::{DecodeError, SchedulerError};
use deafield::feedback::CollectingSink;
use deafield::model::{FeedbackParams, MemoLibrary, SampleBuffer, Trend};
use deafield::scheduler::{AnalysisEvent, AnalysisScheduler, Trigger};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

/// Library with one finalized memo whose samples live in a MemorySource
fn memory_setup(dir: &TempDir) -> (Arc<MemorySource>, Arc<Mutex<MemoLibrary>>, PathBuf) {
    let path = dir.path().join("1.m4a");
    fs::write(&path, b"placeholder").unwrap();

    let source = Arc::new(MemorySource::new());
    source.insert(path.clone(), step_buffer(176_400, 1.0, 2.0));

    let mut library = MemoLibrary::new();
    library.finalize(&path).unwrap();

    (source, Arc::new(Mutex::new(library)), path)
}

/// Takes `delay` per load and reports each load it starts
struct SlowSource {
    inner: Arc<MemorySource>,
    delay: Duration,
    started: Mutex<Sender<PathBuf>>,
}

impl SampleSource for SlowSource {
    fn load(&self, path: &Path) -> Result<SampleBuffer, DecodeError> {
        let _ = self.started.lock().unwrap().send(path.to_path_buf());
        std::thread::sleep(self.delay);
        self.inner.load(path)
    }
}

fn next_event(events: &Receiver<AnalysisEvent>, trigger: Trigger) -> AnalysisEvent {
    loop {
        let event = events.recv_timeout(WAIT).expect("no analysis event");
        if event.trigger == trigger {
            return event;
        }
    }
}

#[test]
fn test_periodic_tick_analyzes_latest_memo() {
    let dir = TempDir::new().unwrap();
    let (source, library, path) = memory_setup(&dir);
    let sink = CollectingSink::new();
    let analyzer = Arc::new(TrendAnalyzer::new(source, sink.clone()));

    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_millis(20));
    let events = scheduler.start().unwrap();

    let event = next_event(&events, Trigger::Periodic);
    assert_eq!(event.recording, path);
    assert_eq!(event.frequencies, vec![1.0]);
    assert_eq!(event.reading.trend, Trend::Rising);

    scheduler.stop();
    assert!(!scheduler.is_running());
    assert!(sink.count() >= 1);
    assert!(sink.dispatched().iter().all(|p| *p == FeedbackParams::new(1.0, 1.0)));
    assert_eq!(scheduler.analyzer().dominant_frequencies(), vec![1.0]);
}

#[test]
fn test_on_demand_request_uses_same_worker() {
    let dir = TempDir::new().unwrap();
    let (source, library, _latest) = memory_setup(&dir);

    let other = PathBuf::from("/memos/older.m4a");
    source.insert(other.clone(), step_buffer(176_400, 3.0, 1.0));

    let analyzer = Arc::new(TrendAnalyzer::new(source, CollectingSink::new()));
    // Long interval so only the request produces an event
    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_secs(60));
    let events = scheduler.start().unwrap();

    scheduler.request(other.clone()).unwrap();
    let event = next_event(&events, Trigger::OnDemand);
    assert_eq!(event.recording, other);
    assert_eq!(event.frequencies, vec![3.0]);
    assert_eq!(event.reading.trend, Trend::FallingOrEqual);

    scheduler.stop();
}

#[test]
fn test_failed_request_publishes_nothing() {
    let dir = TempDir::new().unwrap();
    let (source, library, _latest) = memory_setup(&dir);
    let sink = CollectingSink::new();
    let analyzer = Arc::new(TrendAnalyzer::new(source, sink.clone()));

    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_secs(60));
    let events = scheduler.start().unwrap();

    scheduler.request("/memos/missing.m4a").unwrap();
    scheduler.stop();

    // Worker is gone and never sent anything
    assert!(events.recv().is_err());
    assert_eq!(sink.count(), 0);
}

#[test]
fn test_lifecycle_errors() {
    let dir = TempDir::new().unwrap();
    let (source, library, path) = memory_setup(&dir);
    let analyzer = Arc::new(TrendAnalyzer::new(source, CollectingSink::new()));
    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_millis(50));

    assert!(matches!(scheduler.request(path.clone()), Err(SchedulerError::NotRunning)));

    let _events = scheduler.start().unwrap();
    assert!(scheduler.is_running());
    assert!(matches!(scheduler.start(), Err(SchedulerError::AlreadyRunning)));

    scheduler.stop();
    scheduler.stop();
    assert!(matches!(scheduler.request(path), Err(SchedulerError::NotRunning)));

    // Restart after stop gets a fresh event stream
    let events = scheduler.start().unwrap();
    assert!(events.recv_timeout(WAIT).is_ok());
}

#[test]
fn test_event_stream_closes_on_drop() {
    let dir = TempDir::new().unwrap();
    let (source, library, _path) = memory_setup(&dir);
    let analyzer = Arc::new(TrendAnalyzer::new(source, CollectingSink::new()));

    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_secs(60));
    let events = scheduler.start().unwrap();
    drop(scheduler);

    assert!(events.recv_timeout(WAIT).is_err());
}

#[test]
fn test_directory_library_picks_up_new_memos() {
    let dir = TempDir::new().unwrap();
    let library = Arc::new(Mutex::new(MemoLibrary::open(dir.path()).unwrap()));
    let sink = CollectingSink::new();
    let analyzer = Arc::new(TrendAnalyzer::new(SymphoniaSource::new(), sink.clone()));

    let mut scheduler =
        AnalysisScheduler::new(analyzer, Arc::clone(&library), Duration::from_millis(20));
    let events = scheduler.start().unwrap();

    // Finalized after start: written elsewhere, then moved in whole.
    // The next tick rescans the directory.
    let staging = TempDir::new_in(dir.path().parent().unwrap()).unwrap();
    let staged = write_step_wav(staging.path(), "memo.wav", 4, 16384, 8192);
    let path = dir.path().join("memo.wav");
    fs::rename(&staged, &path).unwrap();

    let event = next_event(&events, Trigger::Periodic);
    assert_eq!(event.recording, path);
    assert_eq!(event.reading.trend, Trend::FallingOrEqual);
    assert!((event.frequencies[0] - 0.5).abs() < 1e-9);

    scheduler.stop();
    assert_eq!(library.lock().unwrap().len(), 1);
}

#[test]
fn test_periodic_tick_ignores_recording_in_progress() {
    let dir = TempDir::new().unwrap();
    let done = write_step_wav(dir.path(), "1.wav", 4, 8192, 16384);
    // The recorder has created the next memo but not written to it yet
    let in_progress = dir.path().join("2.m4a");
    fs::write(&in_progress, b"").unwrap();

    let library = Arc::new(Mutex::new(MemoLibrary::open(dir.path()).unwrap()));
    let sink = CollectingSink::new();
    let analyzer = Arc::new(TrendAnalyzer::new(SymphoniaSource::new(), sink.clone()));

    let mut scheduler =
        AnalysisScheduler::new(analyzer, Arc::clone(&library), Duration::from_millis(20));
    let events = scheduler.start().unwrap();

    let event = next_event(&events, Trigger::Periodic);
    assert_eq!(event.recording, done);
    assert_eq!(event.reading.trend, Trend::Rising);

    scheduler.stop();
    assert!(sink.count() >= 1);
    assert_eq!(library.lock().unwrap().latest().unwrap().path, done);
}

#[test]
fn test_stop_waits_for_analysis_in_progress() {
    let dir = TempDir::new().unwrap();
    let (memory, library, path) = memory_setup(&dir);
    let (started_tx, started_rx) = mpsc::channel();
    let source = SlowSource {
        inner: memory,
        delay: Duration::from_millis(300),
        started: Mutex::new(started_tx),
    };
    let sink = CollectingSink::new();
    let analyzer = Arc::new(TrendAnalyzer::new(source, sink.clone()));

    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_secs(60));
    let events = scheduler.start().unwrap();

    scheduler.request(path.clone()).unwrap();
    assert_eq!(started_rx.recv_timeout(WAIT).unwrap(), path);
    scheduler.stop();

    // The request finished and published before the worker exited
    let published: Vec<AnalysisEvent> = events.iter().collect();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].trigger, Trigger::OnDemand);
    assert_eq!(published[0].recording, path);
    assert_eq!(sink.count(), 1);

    // Nothing else was loaded after stop
    assert!(started_rx.try_recv().is_err());
}

#[test]
fn test_requests_do_not_delay_periodic_ticks() {
    let dir = TempDir::new().unwrap();
    let (source, library, _latest) = memory_setup(&dir);
    let other = PathBuf::from("/memos/older.m4a");
    source.insert(other.clone(), step_buffer(176_400, 3.0, 1.0));

    let analyzer = Arc::new(TrendAnalyzer::new(source, CollectingSink::new()));
    let mut scheduler = AnalysisScheduler::new(analyzer, library, Duration::from_millis(150));
    let events = scheduler.start().unwrap();

    // Requests arrive far more often than the interval
    let until = Instant::now() + Duration::from_millis(800);
    while Instant::now() < until {
        scheduler.request(other.clone()).unwrap();
        std::thread::sleep(Duration::from_millis(20));
    }
    scheduler.stop();

    let published: Vec<AnalysisEvent> = events.iter().collect();
    let periodic = published.iter().filter(|e| e.trigger == Trigger::Periodic).count();
    let on_demand = published.len() - periodic;
    assert!(periodic >= 2, "only {} periodic events", periodic);
    assert!(on_demand >= 10);
}
