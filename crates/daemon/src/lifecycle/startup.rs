// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use sj_adapters::DumpAdapter;
use sj_core::{Sha256Hasher, SystemClock};
use sj_engine::{JobRunner, ObjectServer, ServiceController};
use tokio::net::UnixListener;
use tracing::{info, warn};

use super::{Config, DaemonState, LifecycleError, StartupResult};
use crate::env::PROTOCOL_VERSION;

/// Start the daemon with `adapter` as the diagnostic collector.
pub async fn startup<D: DumpAdapter>(
    config: &Config,
    adapter: D,
) -> Result<StartupResult<D>, LifecycleError> {
    match startup_inner(config, adapter).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // A lock failure means another daemon owns these files
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Each step may leave files behind; `startup` removes them on error.
async fn startup_inner<D: DumpAdapter>(
    config: &Config,
    adapter: D,
) -> Result<StartupResult<D>, LifecycleError> {
    // 1. State directory
    std::fs::create_dir_all(&config.state_dir)?;
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 2. Exclusive lock. Opened without truncation so a running daemon's
    // PID survives a failed attempt.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    // Lock held: replace the contents with our PID
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Version file and working storage root
    std::fs::write(&config.version_path, PROTOCOL_VERSION)?;
    tokio::fs::create_dir_all(&config.engine.work_root).await?;

    // 4. Engine
    let runner = JobRunner::new(config.engine.clone(), adapter, config.dump);
    let controller =
        ServiceController::new(runner, ObjectServer::new(), Arc::new(Sha256Hasher), SystemClock);

    // 5. Bind last, replacing a socket left by a crashed daemon
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        socket = %config.socket_path.display(),
        work_root = %config.engine.work_root.display(),
        max_active = config.engine.max_active,
        "Daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            controller,
            start_time: Instant::now(),
        },
        listener,
    })
}

/// Remove the socket, version and PID files after a failed startup.
fn cleanup_on_failure(config: &Config) {
    for path in [&config.socket_path, &config.version_path, &config.lock_path] {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "startup cleanup failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
