// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration: defaults, an optional JSON file and
//! command-line overrides.

use hearth_core::cli::{CliError, CommandLine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors raised while loading or validating an [`AppConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for [`AppConfig`].
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        /// The file that was parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A command-line override could not be applied.
    #[error(transparent)]
    CommandLine(#[from] CliError),
    /// A value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter, used when `RUST_LOG` is not set.
    pub level: String,
    /// Optional file receiving a copy of every record.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Everything the engine needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Main window title.
    pub title: String,
    /// Main window inner width.
    pub width: u32,
    /// Main window inner height.
    pub height: u32,
    /// Pause between frame-loop ticks while the main window is minimized.
    pub idle_delay_ms: u64,
    /// Period of the frame statistics summary.
    pub stats_interval_secs: u64,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Hearth".to_string(),
            width: 1280,
            height: 720,
            idle_delay_ms: 10,
            stats_interval_secs: 5,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the configuration from the command line.
    ///
    /// The file named by `--config` is loaded first, then `--title`,
    /// `--width`, `--height`, `--log-level` and `--log-file` override it.
    /// The result is validated.
    pub fn from_command_line(cli: &CommandLine) -> Result<Self, ConfigError> {
        let mut config = match cli.option("config") {
            Some(path) if !path.is_empty() => Self::from_json_file(path)?,
            _ => Self::default(),
        };

        if let Some(title) = cli.option("title") {
            config.title = title.to_string();
        }
        config.width = cli.parse_option_or("width", config.width)?;
        config.height = cli.parse_option_or("height", config.height)?;
        if let Some(level) = cli.option("log-level") {
            config.log.level = level.to_string();
        }
        if let Some(file) = cli.option("log-file") {
            config.log.file = (!file.is_empty()).then(|| PathBuf::from(file));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.stats_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "stats_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.log.level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.log.level
            )));
        }
        Ok(())
    }

    /// [`idle_delay_ms`](Self::idle_delay_ms) as a `Duration`.
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    /// [`stats_interval_secs`](Self::stats_interval_secs) as a `Duration`.
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }
}
