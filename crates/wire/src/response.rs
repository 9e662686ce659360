// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use sj_core::{JobId, ObjectPath};

/// Response from the daemon to a bus client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Active job IDs in admission order
    Active { ids: Vec<JobId> },

    /// Whether execution was initiated (not the job's eventual outcome)
    Started { ok: bool },

    /// Whether the cancel request reached a live job
    Cancelled { ok: bool },

    /// Result of an object method call
    Reply { ok: bool },

    /// Published object paths
    Objects { paths: Vec<ObjectPath> },

    /// Daemon status
    Status {
        uptime_secs: u64,
        active: usize,
        max_active: usize,
        /// Diagnostic bundles still awaiting completion
        #[serde(default)]
        pending_dumps: usize,
    },

    /// Daemon is shutting down
    ShuttingDown,

    /// Error response
    Error { message: String },
}
