// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve state directory: SJ_STATE_DIR > XDG_STATE_HOME/sj > ~/.local/state/sj
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("SJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("sj"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/sj"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var("SJ_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Admission limit override (`SJ_MAX_ACTIVE`)
pub fn max_active() -> Option<usize> {
    std::env::var("SJ_MAX_ACTIVE").ok().and_then(|s| s.parse::<usize>().ok())
}

/// Working storage root override (`SJ_WORK_ROOT`)
pub fn work_root() -> Option<PathBuf> {
    std::env::var("SJ_WORK_ROOT").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Diagnostic collector socket override (`SJ_DUMP_SOCKET`)
pub fn dump_socket() -> Option<PathBuf> {
    std::env::var("SJ_DUMP_SOCKET").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Backoff between failed bundle requests (`SJ_DUMP_RETRY_MS`)
pub fn dump_retry() -> Option<Duration> {
    std::env::var("SJ_DUMP_RETRY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Log filter directive (`SJ_LOG`, default `info`)
pub fn log_filter() -> String {
    std::env::var("SJ_LOG").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "info".to_string())
}

/// Log to stderr instead of the log file (`SJ_LOG_STDERR=1`)
pub fn log_to_stderr() -> bool {
    matches!(std::env::var("SJ_LOG_STDERR").as_deref(), Ok("1") | Ok("true"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
