//! Configuration loading and WAV path resolution
//!
//! The TOML file is optional. A missing file is not an error: the player
//! logs a warning and runs on compiled defaults, because a boot sound must
//! never hold up boot over a configuration problem.
//!
//! # WAV path priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`BOOTSOUND_WAV`)
//! 3. TOML `wav_path`
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable consulted for the WAV file path
pub const WAV_PATH_ENV: &str = "BOOTSOUND_WAV";

/// Largest WAV file the player will load (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 0x10_0000;

/// Interval between readiness polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Extra wait after the shell reports ready
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 1000;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// WAV file to play (optional, see module docs for resolution order)
    #[serde(default)]
    pub wav_path: Option<PathBuf>,

    /// Upper bound on the WAV file size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Readiness poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay after readiness before playback starts, in milliseconds
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            wav_path: None,
            max_file_size: default_max_file_size(),
            poll_interval_ms: default_poll_interval_ms(),
            grace_period_ms: default_grace_period_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_grace_period_ms() -> u64 {
    DEFAULT_GRACE_PERIOD_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file exists but cannot be read or
    /// parsed. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config = Self::from_toml_str(&content)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }
}

/// Get default configuration file path for the platform
///
/// `~/.config/bootsound/config.toml` on Linux, the platform config
/// directory elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bootsound").join("config.toml"))
}

/// Get OS-dependent default WAV path
pub fn default_wav_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bootsound").join("bootsound.wav"))
        .unwrap_or_else(|| PathBuf::from("./bootsound.wav"))
}

/// Resolve the WAV file path following the priority order in the module docs
pub fn resolve_wav_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    // Priority 4: OS-dependent compiled default
    default_wav_path()
}
