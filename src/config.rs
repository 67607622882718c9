//! Configuration for analysis, scheduling and the memo library
//!
//! Loaded from TOML. Every section and field is optional; missing values
//! fall back to the defaults the recorder app shipped with.

use crate::error::ConfigError;
use crate::model::WindowSpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "deafield.toml";

/// Default per-user config location (tilde expanded)
pub const USER_CONFIG_FILE: &str = "~/.config/deafield/config.toml";

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Parameters of the trend analysis
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Nominal sample rate used to size the windows
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Length of the early prefix window in seconds
    #[serde(default = "default_early_window")]
    pub early_window_secs: f64,

    /// Length of the later prefix window in seconds
    #[serde(default = "default_later_window")]
    pub later_window_secs: f64,

    /// Use the rate reported by the decoder instead of `sample_rate`
    #[serde(default)]
    pub use_decoded_rate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Period between automatic analyses of the latest memo
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Directory holding finalized memos
    #[serde(default = "default_memo_dir")]
    pub memo_dir: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            memo_dir: default_memo_dir(),
        }
    }
}

fn default_sample_rate() -> f64 {
    44100.0
}

fn default_early_window() -> f64 {
    2.0
}

fn default_later_window() -> f64 {
    4.0
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_memo_dir() -> String {
    "~/Documents/Deafield".into()
}

impl AnalysisConfig {
    /// Create the default analysis configuration
    pub fn new() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            early_window_secs: default_early_window(),
            later_window_secs: default_later_window(),
            use_decoded_rate: false,
        }
    }

    /// Set the nominal sample rate
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set both window durations
    pub fn with_windows(mut self, early_secs: f64, later_secs: f64) -> Self {
        self.early_window_secs = early_secs;
        self.later_window_secs = later_secs;
        self
    }

    /// Interpret samples at the decoder's rate
    pub fn with_decoded_rate(mut self, enable: bool) -> Self {
        self.use_decoded_rate = enable;
        self
    }

    pub fn early_window(&self) -> WindowSpec {
        WindowSpec::new(self.early_window_secs)
    }

    pub fn later_window(&self) -> WindowSpec {
        WindowSpec::new(self.later_window_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate > 0.0) || !self.sample_rate.is_finite() {
            return Err(ConfigError::Invalid {
                field: "analysis.sample_rate",
                reason: format!("must be a positive number, got {}", self.sample_rate),
            });
        }
        for (field, secs) in [
            ("analysis.early_window_secs", self.early_window_secs),
            ("analysis.later_window_secs", self.later_window_secs),
        ] {
            if !(secs >= 0.0) || !secs.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be zero or more seconds, got {}", secs),
                });
            }
        }
        Ok(())
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "scheduler.interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl LibraryConfig {
    /// Memo directory with `~` expanded
    pub fn memo_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.memo_dir).as_ref())
    }
}

impl AppConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.scheduler.validate()
    }
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_toml(&content, path)
}

/// Resolve which config file to use: explicit path, local file, user file
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    let user = PathBuf::from(shellexpand::tilde(USER_CONFIG_FILE).as_ref());
    if user.exists() {
        return Some(user);
    }

    None
}
