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

//! Logger initialization.

use crate::config::LogConfig;
use env_logger::{Builder, Env, Target};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Errors raised by [`init_logging`].
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file or its directory could not be created.
    #[error("Failed to open log file '{}': {source}", .path.display())]
    LogFile {
        /// The requested log file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A global logger is already installed.
    #[error("A logger is already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Writes every record to stderr and to a file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let error = |source| LoggingError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(error)?;
    }
    File::create(path).map_err(error)
}

/// Builds the logger without installing it.
///
/// `RUST_LOG` takes precedence over `config.level`. The verbose wgpu
/// internals are capped at `warn`.
pub fn build_logger(config: &LogConfig) -> Result<Builder, LoggingError> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    builder
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("wgpu_core", log::LevelFilter::Warn);

    if let Some(path) = config.file.as_deref() {
        let file = open_log_file(path)?;
        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
    }
    Ok(builder)
}

/// Installs the global logger.
///
/// # Errors
/// Fails if the log file cannot be created or a logger is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    build_logger(config)?.try_init()?;
    if let Some(path) = config.file.as_deref() {
        log::info!("Logging to stderr and '{}'.", path.display());
    }
    Ok(())
}
