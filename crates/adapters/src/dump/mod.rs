// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic collection service adapter.
//!
//! The collector creates diagnostic bundles on request and publishes their
//! progress as property-change notifications. A subscription is a channel of
//! discrete [`ProgressUpdate`] messages; dropping it (or calling
//! [`ProgressSubscription::unsubscribe`]) tears down the underlying watch.

mod socket;

use std::collections::BTreeMap;

use async_trait::async_trait;
use sj_core::ObjectPath;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::DropGuard;

pub use socket::SocketDumpAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeDumpAdapter, FakeDumpCall};

/// Interface carrying bundle progress properties.
pub const PROGRESS_INTERFACE: &str = "sj.Collector.Progress";

/// Property holding the bundle's operation status.
pub const STATUS_PROPERTY: &str = "Status";

/// Errors from the collector
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("collector unavailable: {0}")]
    Unavailable(String),

    #[error("collector rejected request: {0}")]
    Rejected(String),

    #[error("unexpected collector reply: {0}")]
    UnexpectedReply(String),

    #[error("collector protocol error: {0}")]
    Protocol(#[from] sj_wire::ProtocolError),
}

/// One property-change notification for a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub interface: String,
    pub changed: BTreeMap<String, String>,
}

impl ProgressUpdate {
    /// Build an update carrying only a status change.
    pub fn status(status: impl Into<String>) -> Self {
        let mut changed = BTreeMap::new();
        changed.insert(STATUS_PROPERTY.to_string(), status.into());
        Self { interface: PROGRESS_INTERFACE.to_string(), changed }
    }

    /// The `Status` property, when this update changed it.
    pub fn status_value(&self) -> Option<&str> {
        self.changed.get(STATUS_PROPERTY).map(String::as_str)
    }

    /// Whether the status reports completion.
    ///
    /// Accepts the bare `Completed` as well as dotted enum names such as
    /// `...OperationStatus.Completed`.
    pub fn is_completed(&self) -> bool {
        self.status_value()
            .map(|s| s == "Completed" || s.ends_with(".Completed"))
            .unwrap_or(false)
    }
}

/// Live subscription to a bundle's progress notifications.
pub struct ProgressSubscription {
    rx: mpsc::Receiver<ProgressUpdate>,
    _guard: Option<DropGuard>,
}

impl ProgressSubscription {
    /// Wrap a receiver. `guard` is cancelled when the subscription is dropped,
    /// stopping whatever feeds the channel.
    pub fn new(rx: mpsc::Receiver<ProgressUpdate>, guard: Option<DropGuard>) -> Self {
        Self { rx, _guard: guard }
    }

    /// Next notification, or `None` once the collector side closed.
    pub async fn next(&mut self) -> Option<ProgressUpdate> {
        self.rx.recv().await
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

/// Adapter for the diagnostic collection service
#[async_trait]
pub trait DumpAdapter: Clone + Send + Sync + 'static {
    /// Ask the collector to create a bundle; returns its object path.
    async fn create_dump(&self) -> Result<ObjectPath, DumpError>;

    /// Subscribe to progress notifications for the bundle at `path`.
    async fn subscribe(&self, path: &ObjectPath) -> Result<ProgressSubscription, DumpError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
