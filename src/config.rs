//! Shell configuration, loaded from a JSON file.
//!
//! ```json
//! {
//!     "timezone": "utc",
//!     "pretty": true,
//!     "history_file": "/home/me/.findql_history",
//!     "log_filter": "findql=debug"
//! }
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::local_now;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "findql.json";

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV: &str = "FINDQL_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("cannot read config file {path}: {error}")]
    Read { path: PathBuf, error: std::io::Error },

    #[error("cannot parse config file {path}: {error}")]
    Parse {
        path: PathBuf,
        error: serde_json::Error,
    },
}

/// Zone in which relative references such as YESTERDAY are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    #[default]
    Local,
    Utc,
}

impl Zone {
    pub fn now(self) -> DateTime<FixedOffset> {
        match self {
            Zone::Local => local_now(),
            Zone::Utc => {
                let now = Utc::now();
                now.with_timezone(&now.offset().fix())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub timezone: Zone,
    /// Pretty-print the JSON output.
    pub pretty: bool,
    /// Where the interactive prompt keeps its history. No history when unset.
    pub history_file: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            timezone: Zone::Local,
            pretty: true,
            history_file: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl ShellConfig {
    /// Loads the configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;

        serde_json::from_str(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// The file named by `FINDQL_CONFIG`, else `findql.json`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Reference instant for a query parsed now.
    pub fn reference_time(&self) -> DateTime<FixedOffset> {
        self.timezone.now()
    }
}
