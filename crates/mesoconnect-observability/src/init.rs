// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always written to stderr. When a log directory is given,
//! a JSON log file is also written into a timestamped run folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── mesoconnect.log
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Keeps the file writer alive; logs are flushed when dropped
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder of the JSON log file, if file logging is enabled
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

/// Initialize the global tracing subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags
/// * `default_level` - Level for everything not covered by a flag
/// * `log_dir` - Base directory for the JSON log file (disabled when `None`)
///
/// # Errors
///
/// Fails if the run folder cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    default_level: &str,
    log_dir: Option<&Path>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(default_level);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(&filter))
        .boxed();

    let mut layers = vec![console_layer];
    let mut file_guard = None;
    let mut run_dir = None;

    if let Some(base) = log_dir {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let run_folder = base.join(format!("run_{}", timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        let appender = tracing_appender::rolling::never(&run_folder, "mesoconnect.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::new(&filter))
            .boxed();

        layers.push(file_layer);
        file_guard = Some(guard);
        run_dir = Some(run_folder);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        run_dir,
    })
}

/// Initialize console-only logging at the given level
pub fn init_logging_default(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<LoggingGuard> {
    init_logging(debug_flags, default_level, None)
}
