//! Error types for decoding, configuration and scheduling

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading a recording into samples
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open audio file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to probe audio format of {path:?}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("no audio track found in {0:?}")]
    NoAudioTrack(PathBuf),

    #[error("unknown sample rate in {0:?}")]
    UnknownSampleRate(PathBuf),

    #[error("failed to create decoder for {path:?}: {source}")]
    Decoder {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },

    #[error("failed to read packet from {path:?}: {source}")]
    Packet {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },
}

/// Invalid or unreadable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Scheduler lifecycle failures
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error("scheduler is not running")]
    NotRunning,

    #[error("failed to spawn analysis worker: {0}")]
    Spawn(#[source] std::io::Error),
}
