//! Configuration management for the terminal app.

use calcvault_engine::calculator::DEFAULT_ERROR_DISPLAY_MS;
use calcvault_engine::{AngleMode, DEFAULT_MAX_FILE_BYTES};
use std::env;
use std::path::PathBuf;

/// App configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the state file and vault blobs
    pub data_dir: PathBuf,
    /// How long "Error" stays on screen before the calculator clears
    pub error_reset_ms: u64,
    /// Per-file vault size limit in bytes
    pub max_file_bytes: u64,
    /// Password the vault always accepts (optional)
    pub fallback_password: Option<String>,
    /// Angle mode at startup
    pub angle_mode: AngleMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./calcvault-data"),
            error_reset_ms: DEFAULT_ERROR_DISPLAY_MS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            fallback_password: None,
            angle_mode: AngleMode::Radians,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = lookup("CALCVAULT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let error_reset_ms = parse_number(&lookup, "CALCVAULT_ERROR_RESET_MS")?
            .unwrap_or(defaults.error_reset_ms);

        let max_file_bytes = parse_number(&lookup, "CALCVAULT_MAX_FILE_BYTES")?
            .unwrap_or(defaults.max_file_bytes);

        let fallback_password = lookup("CALCVAULT_FALLBACK_PASSWORD").filter(|p| !p.is_empty());

        let angle_mode = match lookup("CALCVAULT_ANGLE_MODE") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidAngleMode(value))?,
            None => defaults.angle_mode,
        };

        Ok(Self {
            data_dir,
            error_reset_ms,
            max_file_bytes,
            fallback_password,
            angle_mode,
        })
    }
}

fn parse_number(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name} value: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid CALCVAULT_ANGLE_MODE value: {0} (expected rad or deg)")]
    InvalidAngleMode(String),
}
