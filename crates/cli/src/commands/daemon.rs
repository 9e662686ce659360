// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj ping`, `sj status`, `sj shutdown`

use anyhow::Result;

use crate::client::{ClientError, DaemonClient};
use crate::output::{format_or_json, format_uptime, OutputFormat};

pub async fn ping(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.ping().await?;
    let version = client.hello().await?;
    format_or_json(format, &serde_json::json!({ "pong": true, "version": version }), || {
        println!("pong (sjd {version})");
    })
}

/// Status prints a notice rather than failing when no daemon is running.
pub async fn status(client: Result<DaemonClient, ClientError>, format: OutputFormat) -> Result<()> {
    let client = match client {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning(_)) => {
            return format_or_json(format, &serde_json::json!({ "running": false }), || {
                println!("Daemon is not running");
            });
        }
        Err(e) => return Err(e.into()),
    };

    let status = client.status().await?;
    format_or_json(format, &status, || {
        println!("Daemon uptime: {}", format_uptime(status.uptime_secs));
        println!("Active jobs: {}/{}", status.active, status.max_active);
        if status.pending_dumps > 0 {
            println!("Pending diagnostic bundles: {}", status.pending_dumps);
        }
    })
}

pub async fn shutdown(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.shutdown().await?;
    format_or_json(format, &serde_json::json!({ "shutting_down": true }), || {
        println!("Daemon shutting down");
    })
}
