// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup for the daemon.
//!
//! Logs go to `<state_dir>/daemon.log` through a non-blocking writer, or to
//! stderr when `SJ_LOG_STDERR` is set. `SJ_LOG` holds the filter directives.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::env;
use crate::lifecycle::{Config, LifecycleError};

/// Install the global subscriber. The returned guard flushes the log file
/// on drop and must be held for the life of the process.
pub fn init(config: &Config) -> Result<Option<WorkerGuard>, LifecycleError> {
    let filter = EnvFilter::try_new(env::log_filter())
        .map_err(|e| LifecycleError::Logging(e.to_string()))?;

    if env::log_to_stderr() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()
            .map_err(|e| LifecycleError::Logging(e.to_string()))?;
        return Ok(None);
    }

    std::fs::create_dir_all(&config.state_dir)?;
    let file_name = config
        .log_path
        .file_name()
        .ok_or_else(|| LifecycleError::Logging(format!("bad log path {}", config.log_path.display())))?;
    let appender = tracing_appender::rolling::never(&config.state_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(|e| LifecycleError::Logging(e.to_string()))?;
    Ok(Some(guard))
}
