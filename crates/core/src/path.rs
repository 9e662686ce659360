// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus object paths.
//!
//! Objects published on the daemon bus are addressed by slash-separated
//! paths. The service object lives at [`SERVICE_PATH`]; each active job
//! publishes a remote-control object at `JOBS_ROOT/<job-id>`. Bundle paths
//! returned by the diagnostic collector use the same shape, with the bundle
//! ID as the last segment.

use serde::{Deserialize, Serialize};

use crate::job::JobId;

/// Path of the top-level service object.
pub const SERVICE_PATH: &str = "/sj";

/// Parent path of per-job remote-control objects.
pub const JOBS_ROOT: &str = "/sj/jobs";

/// Slash-separated bus object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Remote-control object path for a job.
    pub fn for_job(id: &JobId) -> Self {
        Self(format!("{JOBS_ROOT}/{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment (`/a/b/c` → `c`), `None` for the root or a
    /// trailing slash.
    pub fn last_segment(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Everything before the final segment (`/a/b/c` → `/a/b`).
    pub fn parent(&self) -> Option<&str> {
        let (parent, _) = self.0.rsplit_once('/')?;
        Some(if parent.is_empty() { "/" } else { parent })
    }

    /// Job ID if this is a per-job object path.
    pub fn job_id(&self) -> Option<JobId> {
        let rest = self.0.strip_prefix(JOBS_ROOT)?.strip_prefix('/')?;
        (!rest.is_empty() && !rest.contains('/')).then(|| JobId::new(rest))
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ObjectPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
