// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use sj_core::{JobId, ObjectPath};

/// Request from a bus client to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// List IDs of active jobs, oldest first
    ListActive,

    /// Start a script as a new job (admission control applies)
    Start {
        script: String,
        /// Seconds before the job is cancelled; 0 disables the timeout
        #[serde(default)]
        timeout_secs: u64,
        #[serde(default)]
        dump_needed: bool,
    },

    /// Cancel an active job by ID
    Cancel { id: JobId },

    /// Invoke a method on a published object (e.g. `cancel` on `/sj/jobs/<id>`)
    Call { path: ObjectPath, method: String },

    /// List published object paths
    Objects,

    /// Get daemon status
    Status,

    /// Request daemon shutdown (terminates running scripts)
    Shutdown,
}
