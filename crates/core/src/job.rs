// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, submission parameters and outcome.

use serde::{Deserialize, Serialize};
use std::time::Duration;

crate::define_id! {
    /// Content-derived identifier for a job.
    ///
    /// Hex digest of the timestamp-salted script body, truncated to
    /// [`crate::JOB_ID_LEN`] characters. Also names the job's working
    /// directory and its remote-control object.
    pub struct JobId;
}

/// A job as admitted by the service controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: JobId,
    /// Shell script body, written verbatim to `<id>.sh`
    pub script: String,
    /// Seconds before the job is cancelled; 0 disables the timeout
    pub timeout_secs: u64,
    /// Request a diagnostic bundle after the script finishes
    pub dump_needed: bool,
}

impl JobSpec {
    pub fn new(id: JobId, script: impl Into<String>) -> Self {
        Self { id, script: script.into(), timeout_secs: 0, dump_needed: false }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn dump_needed(mut self, dump_needed: bool) -> Self {
        self.dump_needed = dump_needed;
        self
    }

    /// The timeout as a duration, or `None` when the job runs unbounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// How a job's execution ended, as reported to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    /// Script ran to completion. A non-zero exit code is still a completion.
    Completed { exit_code: i32 },
    /// Script was terminated by a cancel request (explicit, eviction or timeout)
    Cancelled,
    /// Script could not be spawned, or an I/O fault interrupted execution
    Aborted { reason: String },
}

impl JobOutcome {
    /// True for completions, including non-zero exits.
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }
}

crate::simple_display! {
    JobOutcome {
        Completed { .. } => "completed",
        Cancelled => "cancelled",
        Aborted { .. } => "aborted",
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
