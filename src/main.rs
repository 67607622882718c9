use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deafield::analysis::{SymphoniaSource, TrendAnalyzer};
use deafield::config::{self, AppConfig};
use deafield::feedback::{FeedbackSink, JsonLinesSink, LogSink};
use deafield::model::{MemoLibrary, TrendReading};
use deafield::scheduler::AnalysisScheduler;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type Sink = Box<dyn FeedbackSink + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "deafield")]
#[command(about = "Analyze voice memos and drive haptic feedback from their frequency trend", long_about = None)]
struct Args {
    /// Config file (default: ./deafield.toml, then ~/.config/deafield/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Where haptic feedback goes
    #[arg(long, value_enum, default_value = "log", global = true)]
    sink: SinkKind,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one recording now
    Analyze {
        /// Finalized recording to analyze
        file: PathBuf,

        /// Nominal sample rate used to size the windows
        #[arg(long)]
        sample_rate: Option<f64>,

        /// Use the decoder's sample rate instead of the nominal one
        #[arg(long)]
        decoded_rate: bool,
    },

    /// Periodically analyze the newest memo in a directory
    Watch {
        /// Memo directory (default from config)
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,

        /// Milliseconds between analyses
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many seconds (default: run until killed)
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Evaluate every memo without playing feedback
    Report {
        /// Memo directory (default from config)
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List finalized memos, oldest first
    List {
        /// Memo directory (default from config)
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkKind {
    /// Log each feedback dispatch
    Log,
    /// Print each haptic pattern as a JSON line on stdout
    Json,
}

impl SinkKind {
    /// The JSON sink owns stdout, so readable output moves to stderr
    fn stdout_is_reserved(self) -> bool {
        matches!(self, SinkKind::Json)
    }

    fn print(self, line: &str) {
        if self.stdout_is_reserved() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

#[derive(Serialize)]
struct ReportRow<'a> {
    recording: &'a Path,
    reading: Option<TrendReading>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut app_config = load_app_config(args.config.as_deref())?;

    match args.command {
        Command::Analyze {
            file,
            sample_rate,
            decoded_rate,
        } => {
            if let Some(rate) = sample_rate {
                app_config.analysis.sample_rate = rate;
            }
            if decoded_rate {
                app_config.analysis.use_decoded_rate = true;
            }
            app_config.validate()?;

            if !file.exists() {
                anyhow::bail!("Recording not found: {}", file.display());
            }

            let analyzer = build_analyzer(&app_config, args.sink);
            match analyzer.analyze_file(&file) {
                Some(reading) => args.sink.print(&reading_line(&file, &reading)),
                None => args.sink.print(&format!("{}: no result", file.display())),
            }
        }

        Command::Watch {
            dir,
            interval_ms,
            duration,
        } => {
            if let Some(ms) = interval_ms {
                app_config.scheduler.interval_ms = ms;
            }
            app_config.validate()?;

            let dir = dir.unwrap_or_else(|| app_config.library.memo_dir());
            let library = MemoLibrary::open(&dir)?;
            log::info!("Watching {:?} ({} memos)", dir, library.len());

            let analyzer = Arc::new(build_analyzer(&app_config, args.sink));
            let mut scheduler = AnalysisScheduler::new(
                analyzer,
                Arc::new(Mutex::new(library)),
                app_config.scheduler.interval(),
            );
            let events = scheduler.start()?;

            let deadline = duration.map(|secs| Instant::now() + Duration::from_secs(secs));
            loop {
                let received = match deadline {
                    Some(deadline) => {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        if remaining.is_zero() {
                            break;
                        }
                        events.recv_timeout(remaining)
                    }
                    None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };

                match received {
                    Ok(event) => {
                        log::debug!("{:?} analysis at {}", event.trigger, event.analyzed_at);
                        args.sink.print(&reading_line(&event.recording, &event.reading));
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        log::warn!("Analysis worker stopped unexpectedly");
                        break;
                    }
                }
            }

            scheduler.stop();
        }

        Command::Report { dir, json } => {
            app_config.validate()?;
            let dir = dir.unwrap_or_else(|| app_config.library.memo_dir());
            let library = MemoLibrary::open(&dir)?;

            let analyzer = build_analyzer(&app_config, args.sink);
            let rows: Vec<ReportRow> = library
                .recordings()
                .par_iter()
                .map(|r| ReportRow {
                    recording: &r.path,
                    reading: analyzer.evaluate_file(&r.path),
                })
                .collect();

            if json {
                let out = serde_json::to_string_pretty(&rows).context("Failed to encode report")?;
                println!("{}", out);
            } else {
                for row in &rows {
                    match &row.reading {
                        Some(reading) => args.sink.print(&reading_line(row.recording, reading)),
                        None => args.sink.print(&format!("{}: no result", row.recording.display())),
                    }
                }
                log::info!("Evaluated {} memos", rows.len());
            }
        }

        Command::List { dir } => {
            let dir = dir.unwrap_or_else(|| app_config.library.memo_dir());
            let library = MemoLibrary::open(&dir)?;
            for recording in library.recordings() {
                println!(
                    "{}  {:>10} bytes  {}",
                    recording.modified.format("%Y-%m-%d %H:%M:%S"),
                    recording.size_bytes,
                    recording.path.display()
                );
            }
        }
    }

    Ok(())
}

/// Load the config file if one is found; CLI flags are applied afterwards
fn load_app_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = config::find_config(explicit) else {
        return Ok(AppConfig::default());
    };

    match config::load_config(&path) {
        Ok(cfg) => {
            log::info!("Loaded config from {}", path.display());
            Ok(cfg)
        }
        // An explicitly requested file must load
        Err(e) if explicit.is_some() => Err(e).context("Failed to load config"),
        Err(e) => {
            log::warn!("Ignoring config {}: {}", path.display(), e);
            Ok(AppConfig::default())
        }
    }
}

fn build_analyzer(app_config: &AppConfig, kind: SinkKind) -> TrendAnalyzer<SymphoniaSource, Sink> {
    let sink: Sink = match kind {
        SinkKind::Log => Box::new(LogSink::new()),
        SinkKind::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
    };
    TrendAnalyzer::with_config(SymphoniaSource::new(), sink, app_config.analysis.clone())
}

fn reading_line(path: &Path, reading: &TrendReading) -> String {
    format!(
        "{}: frequency={:.6} later={:.6} trend={} intensity={:.1} sharpness={:.1}",
        path.display(),
        reading.frequency(),
        reading.later_estimate,
        reading.trend,
        reading.feedback.intensity,
        reading.feedback.sharpness
    )
}
