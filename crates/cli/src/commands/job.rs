// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj start`, `sj active`, `sj cancel`

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use sj_core::JobId;

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};

/// Read a script body from `source`, or from stdin when it is `-`.
pub fn read_script(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body).context("failed to read script from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(source)
        .with_context(|| format!("failed to read script {}", source.display()))
}

pub async fn start(
    client: &DaemonClient,
    source: &Path,
    timeout_secs: u64,
    dump_needed: bool,
    format: OutputFormat,
) -> Result<()> {
    let script = read_script(source)?;
    if !client.start(script, timeout_secs, dump_needed).await? {
        return Err(ExitError::refused("job was not started (see daemon log)").into());
    }

    let data = serde_json::json!({
        "started": true,
        "timeout_secs": timeout_secs,
        "dump_needed": dump_needed,
    });
    format_or_json(format, &data, || {
        let timeout = match timeout_secs {
            0 => "no timeout".to_string(),
            n => format!("timeout {n}s"),
        };
        println!("Job started ({timeout})");
    })
}

pub async fn active(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let ids = client.list_active().await?;
    handle_list(format, &ids, "No active jobs", |ids, out| {
        for id in ids {
            let _ = writeln!(out, "{}", color::header(id.as_str()));
        }
    })
}

pub async fn cancel(client: &DaemonClient, id: &str, format: OutputFormat) -> Result<()> {
    let id = JobId::new(id);
    if !client.cancel(id.clone()).await? {
        return Err(ExitError::refused(format!("no active job {id}")).into());
    }
    format_or_json(format, &serde_json::json!({ "cancelled": id }), || {
        println!("Cancelled {}", color::header(id.as_str()));
    })
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
