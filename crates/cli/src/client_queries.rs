// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query and command methods for DaemonClient.

use serde::Serialize;
use sj_core::{JobId, ObjectPath};
use sj_wire::{Request, Response};

use super::{ClientError, DaemonClient};

/// Daemon status snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub active: usize,
    pub max_active: usize,
    pub pending_dumps: usize,
}

impl DaemonClient {
    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: env!("CARGO_PKG_VERSION").to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { uptime_secs, active, max_active, pending_dumps } => {
                Ok(DaemonStatus { uptime_secs, active, max_active, pending_dumps })
            }
            other => Self::reject(other),
        }
    }

    /// Active job IDs, oldest first
    pub async fn list_active(&self) -> Result<Vec<JobId>, ClientError> {
        match self.send(&Request::ListActive).await? {
            Response::Active { ids } => Ok(ids),
            other => Self::reject(other),
        }
    }

    /// Start a job. `Ok(false)` means the daemon refused to start it.
    pub async fn start(
        &self,
        script: String,
        timeout_secs: u64,
        dump_needed: bool,
    ) -> Result<bool, ClientError> {
        match self.send(&Request::Start { script, timeout_secs, dump_needed }).await? {
            Response::Started { ok } => Ok(ok),
            other => Self::reject(other),
        }
    }

    /// Cancel a job. `Ok(false)` means no such active job.
    pub async fn cancel(&self, id: JobId) -> Result<bool, ClientError> {
        match self.send(&Request::Cancel { id }).await? {
            Response::Cancelled { ok } => Ok(ok),
            other => Self::reject(other),
        }
    }

    pub async fn objects(&self) -> Result<Vec<ObjectPath>, ClientError> {
        match self.send(&Request::Objects).await? {
            Response::Objects { paths } => Ok(paths),
            other => Self::reject(other),
        }
    }

    /// Invoke `method` on the object at `path`
    pub async fn call(&self, path: ObjectPath, method: String) -> Result<bool, ClientError> {
        match self.send(&Request::Call { path, method }).await? {
            Response::Reply { ok } => Ok(ok),
            other => Self::reject(other),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}
