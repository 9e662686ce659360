// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use sj_adapters::DumpAdapter;
use sj_core::SystemClock;
use sj_engine::{DumpConfig, EngineConfig, ServiceController};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::config::FileConfig;
use crate::env;

/// Controller with the daemon's clock
pub type DaemonController<D> = ServiceController<D, SystemClock>;

/// Timeout applied to a script passed on the daemon command line.
pub const STARTUP_SCRIPT_TIMEOUT_SECS: u64 = 30;

/// Daemon configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/sj)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the optional config file
    pub config_path: PathBuf,
    /// Diagnostic collector socket
    pub dump_socket: PathBuf,
    pub engine: EngineConfig,
    pub dump: DumpConfig,
}

impl Config {
    /// Load configuration for the user-level daemon: state directory from
    /// the environment, then `config.toml`, then environment overrides.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        let file = FileConfig::load(&state_dir.join("config.toml"))?;
        Ok(Self::resolve(state_dir, &file))
    }

    /// Defaults for `state_dir`, ignoring file and environment.
    pub fn for_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            config_path: state_dir.join("config.toml"),
            dump_socket: state_dir.join("collector.sock"),
            engine: EngineConfig::default(),
            dump: DumpConfig::default(),
            state_dir,
        }
    }

    /// Apply `file`, then environment overrides, on top of the defaults.
    pub fn resolve(state_dir: PathBuf, file: &FileConfig) -> Self {
        let mut config = Self::for_state_dir(state_dir);

        let mut engine = config.engine.clone();
        if let Some(n) = env::max_active().or(file.engine.max_active) {
            engine = engine.max_active(n);
        }
        if let Some(root) = env::work_root().or_else(|| file.engine.work_root.clone()) {
            engine = engine.work_root(root);
        }
        if let Some(shell) = &file.engine.shell {
            engine = engine.shell(shell.clone());
        }
        config.engine = engine;

        if let Some(socket) = env::dump_socket().or_else(|| file.dump.socket.clone()) {
            config.dump_socket = socket;
        }
        if let Some(backoff) = env::dump_retry().or(file.dump.retry_secs.map(Duration::from_secs)) {
            config.dump.retry_backoff = backoff;
        }
        config
    }
}

/// Daemon state during operation.
pub struct DaemonState<D: DumpAdapter> {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub controller: DaemonController<D>,
    /// When daemon started
    pub start_time: Instant,
}

/// Result of daemon startup: the daemon state and the bound socket.
pub struct StartupResult<D: DumpAdapter> {
    pub daemon: DaemonState<D>,
    /// The Unix socket listener to spawn as a Listener task
    pub listener: UnixListener,
}

impl<D: DumpAdapter> DaemonState<D> {
    /// Run a script given on the command line: 30 s timeout, diagnostic
    /// bundle requested.
    pub async fn start_script(&self, script: String) -> bool {
        let started = self.controller.start(script, STARTUP_SCRIPT_TIMEOUT_SECS, true).await;
        if !started {
            warn!("startup script was not admitted");
        }
        started
    }

    /// Shutdown the daemon: terminate running scripts, then remove the
    /// socket, PID and version files.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        self.controller.shutdown().await;

        for (path, what) in [
            (&self.config.socket_path, "socket"),
            (&self.config.lock_path, "PID"),
            (&self.config.version_path, "version"),
        ] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!("Failed to remove {} file: {}", what, e);
                }
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
