// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sjd`: script jobs daemon.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sj_adapters::SocketDumpAdapter;
use sj_daemon::{env, logging, startup, Config, LifecycleError, ListenCtx, Listener, StartupResult};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "sjd", version, about = "Single-node script job daemon")]
struct Args {
    /// Script file to run as soon as the daemon is up (30 s timeout, with a
    /// diagnostic bundle)
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let script = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(body) => Some(body),
            Err(e) => {
                eprintln!("sjd: cannot read {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sjd: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match logging::init(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("sjd: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("sjd: failed to build runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config, script)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "daemon failed");
            eprintln!("sjd: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, script: Option<String>) -> Result<(), LifecycleError> {
    let adapter = SocketDumpAdapter::new(config.dump_socket.clone(), env::ipc_timeout());
    let StartupResult { mut daemon, listener } = startup(&config, adapter).await?;

    let shutdown = Arc::new(Notify::new());
    let ctx = Arc::new(ListenCtx {
        controller: daemon.controller.clone(),
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
        ipc_timeout: env::ipc_timeout(),
    });
    let listener_task = tokio::spawn(Listener::new(listener, ctx).run());

    if let Some(script) = script {
        daemon.start_script(script).await;
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested by client"),
        _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
        _ = sigterm.recv() => info!("received SIGTERM"),
    }

    listener_task.abort();
    daemon.shutdown().await
}
