// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job working storage: `<root>/<id>/<id>.sh` and `<root>/<id>/<id>.out`.

use std::io;
use std::path::{Path, PathBuf};

use sj_core::JobId;
use tokio::fs::File;

/// Paths of one job's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    dir: PathBuf,
    script: PathBuf,
    output: PathBuf,
}

impl WorkDir {
    pub fn new(root: &Path, id: &JobId) -> Self {
        let dir = root.join(id.as_str());
        let script = dir.join(format!("{id}.sh"));
        let output = dir.join(format!("{id}.out"));
        Self { dir, script, output }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn script_path(&self) -> &Path {
        &self.script
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    /// Create the directory if needed and write the script body.
    pub async fn write_script(&self, body: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&self.script, body).await
    }

    /// Create (or truncate) the output capture file.
    pub async fn create_output(&self) -> io::Result<File> {
        tokio::fs::create_dir_all(&self.dir).await?;
        File::create(&self.output).await
    }

    /// Remove the directory and everything in it. Missing is fine.
    pub async fn reclaim(&self) -> io::Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod tests;
