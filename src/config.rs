//! Configuration for results naming and storage.
//!
//! Settings are loaded from:
//! 1. a TOML file (base configuration)
//! 2. environment variables (prefixed with `DAQ_RESULTS_`)
//!
//! # Environment Variable Overrides
//!
//! Nested keys are addressed with a double underscore so field names
//! containing `_` stay reachable:
//!
//! ```text
//! DAQ_RESULTS_STORAGE__DIRECTORY=/data/run42
//! DAQ_RESULTS_STORAGE__DATED_FOLDER=true
//! DAQ_RESULTS_NAMING__TIME_FORMAT="%H%M%S"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use daq_results::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     println!("Results directory: {}", settings.storage.directory.display());
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::Local;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ResultsError};
use crate::naming;

/// Top-level settings for the crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Where and how results files are placed.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Timestamp formats used in file names.
    #[serde(default)]
    pub naming: NamingSettings,
}

/// Placement of results files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Base directory for results files.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// File name prefix; may contain placeholders.
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,
    /// File name suffix between index and extension; may contain placeholders.
    #[serde(default)]
    pub filename_suffix: String,
    /// File extension, without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Place files inside a per-day subdirectory.
    #[serde(default)]
    pub dated_folder: bool,
    /// Append `_N` with the first free index to avoid collisions.
    #[serde(default = "default_use_index")]
    pub use_index: bool,
}

/// Timestamp formats (chrono strftime syntax).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingSettings {
    /// Datestamp appended to the filename prefix.
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
    /// Rendering of the `{date}` alias and of dated folder names.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Rendering of the `{time}` alias.
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            filename_prefix: default_filename_prefix(),
            filename_suffix: String::new(),
            extension: default_extension(),
            dated_folder: false,
            use_index: default_use_index(),
        }
    }
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            datetime_format: default_datetime_format(),
            date_format: default_date_format(),
            time_format: default_time_format(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_directory() -> PathBuf {
    PathBuf::from("data")
}

fn default_filename_prefix() -> String {
    "DATA".to_string()
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_use_index() -> bool {
    true
}

fn default_datetime_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_time_format() -> String {
    "%H-%M-%S".to_string()
}

// ============================================================================
// Loading and Validation
// ============================================================================

impl Settings {
    /// Load settings from `config/results.toml` and environment variables.
    ///
    /// Precedence, highest to lowest:
    /// 1. environment variables (`DAQ_RESULTS_` prefix)
    /// 2. the TOML file
    /// 3. built-in defaults
    ///
    /// After loading, settings are validated.
    pub fn load() -> AppResult<Self> {
        Self::load_from("config/results.toml")
    }

    /// Load settings from a specific file path.
    ///
    /// A missing file is not an error; environment variables and defaults
    /// still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let settings: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DAQ_RESULTS_").split("__"))
            .extract()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings after loading.
    ///
    /// Checks:
    /// - extension is non-empty and carries no dot or path separator
    /// - filename prefix and suffix stay within a single path component
    /// - every timestamp format actually renders
    pub fn validate(&self) -> AppResult<()> {
        if self.storage.extension.is_empty() {
            return Err(ResultsError::Configuration(
                "'extension' cannot be empty".to_string(),
            ));
        }
        if self.storage.extension.contains(['.', '/', '\\']) {
            return Err(ResultsError::Configuration(format!(
                "Invalid extension '{}'. Must not contain '.' or path separators",
                self.storage.extension
            )));
        }

        for (key, value) in [
            ("filename_prefix", &self.storage.filename_prefix),
            ("filename_suffix", &self.storage.filename_suffix),
        ] {
            if value.contains(['/', '\\']) {
                return Err(ResultsError::Configuration(format!(
                    "Invalid {} '{}'. Must not contain path separators",
                    key, value
                )));
            }
        }

        let now = Local::now();
        for (key, format) in [
            ("datetime_format", &self.naming.datetime_format),
            ("date_format", &self.naming.date_format),
            ("time_format", &self.naming.time_format),
        ] {
            if naming::format_timestamp(&now, format).is_err() {
                return Err(ResultsError::Configuration(format!(
                    "Invalid {} '{}'. Not a renderable strftime string",
                    key, format
                )));
            }
        }

        Ok(())
    }
}
