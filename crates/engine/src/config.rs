// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrently active jobs.
pub const DEFAULT_MAX_ACTIVE: usize = 1;

/// Default parent directory of per-job working storage.
pub const DEFAULT_WORK_ROOT: &str = "/tmp/sj";

/// Default interpreter for job scripts.
pub const DEFAULT_SHELL: &str = "bash";

/// Default delay between failed `create_dump` attempts.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(20);

/// Job execution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Admission limit; never below 1
    pub max_active: usize,
    pub work_root: PathBuf,
    pub shell: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_active: DEFAULT_MAX_ACTIVE,
            work_root: PathBuf::from(DEFAULT_WORK_ROOT),
            shell: PathBuf::from(DEFAULT_SHELL),
        }
    }
}

impl EngineConfig {
    /// Set the admission limit. Values below 1 are raised to 1.
    pub fn max_active(mut self, max_active: usize) -> Self {
        self.max_active = max_active.max(1);
        self
    }

    pub fn work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = work_root.into();
        self
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }
}

/// Diagnostic bundle workflow settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    pub retry_backoff: Duration,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self { retry_backoff: DEFAULT_RETRY_BACKOFF }
    }
}
