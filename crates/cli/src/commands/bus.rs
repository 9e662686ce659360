// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj objects`, `sj call`

use std::io::Write;

use anyhow::Result;
use sj_core::ObjectPath;

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, handle_list, OutputFormat};

pub async fn objects(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let paths = client.objects().await?;
    handle_list(format, &paths, "No published objects", |paths, out| {
        for path in paths {
            let _ = writeln!(out, "{path}");
        }
    })
}

pub async fn call(client: &DaemonClient, path: &str, method: &str, format: OutputFormat) -> Result<()> {
    let path = ObjectPath::new(path);
    let ok = client.call(path.clone(), method.to_string()).await?;
    if !ok {
        return Err(ExitError::refused(format!("{method} on {path} had no effect")).into());
    }
    let data = serde_json::json!({ "path": path, "method": method, "ok": ok });
    format_or_json(format, &data, || {
        println!("{} {}: ok", color::muted(path.as_str()), method);
    })
}
