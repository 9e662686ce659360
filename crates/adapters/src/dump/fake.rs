// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory collector for tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sj_core::ObjectPath;
use tokio::sync::mpsc;

use super::{DumpAdapter, DumpError, ProgressSubscription, ProgressUpdate};

/// Recorded collector call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeDumpCall {
    Create,
    Subscribe(ObjectPath),
}

#[derive(Default)]
struct FakeDumpState {
    calls: Vec<FakeDumpCall>,
    failing_creates: usize,
    failing_subscribes: usize,
    next_bundle: u64,
    subscribers: HashMap<ObjectPath, mpsc::Sender<ProgressUpdate>>,
}

/// Fake collector: bundles are created at `/collector/entry/<n>` and
/// notifications are pushed by the test through [`FakeDumpAdapter::notify`].
#[derive(Clone, Default)]
pub struct FakeDumpAdapter {
    inner: Arc<Mutex<FakeDumpState>>,
}

impl FakeDumpAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` `create_dump` calls fail.
    pub fn fail_next_creates(&self, n: usize) {
        self.inner.lock().failing_creates = n;
    }

    /// Make the next `n` `subscribe` calls fail.
    pub fn fail_next_subscribes(&self, n: usize) {
        self.inner.lock().failing_subscribes = n;
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<FakeDumpCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of `create_dump` attempts (failed ones included).
    pub fn create_attempts(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, FakeDumpCall::Create)).count()
    }

    /// Whether a live subscriber is attached to `path`.
    pub fn is_subscribed(&self, path: &ObjectPath) -> bool {
        self.inner.lock().subscribers.get(path).map(|tx| !tx.is_closed()).unwrap_or(false)
    }

    /// Push a notification to the subscriber of `path`. Returns false when
    /// nobody is listening.
    pub async fn notify(&self, path: &ObjectPath, update: ProgressUpdate) -> bool {
        let tx = self.inner.lock().subscribers.get(path).cloned();
        match tx {
            Some(tx) => tx.send(update).await.is_ok(),
            None => false,
        }
    }

    /// Drop the collector side of a subscription, as if the service went away.
    pub fn close(&self, path: &ObjectPath) {
        self.inner.lock().subscribers.remove(path);
    }
}

#[async_trait]
impl DumpAdapter for FakeDumpAdapter {
    async fn create_dump(&self) -> Result<ObjectPath, DumpError> {
        let mut state = self.inner.lock();
        state.calls.push(FakeDumpCall::Create);
        if state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(DumpError::Unavailable("fake collector offline".to_string()));
        }
        state.next_bundle += 1;
        Ok(ObjectPath::new(format!("/collector/entry/{}", state.next_bundle)))
    }

    async fn subscribe(&self, path: &ObjectPath) -> Result<ProgressSubscription, DumpError> {
        let mut state = self.inner.lock();
        state.calls.push(FakeDumpCall::Subscribe(path.clone()));
        if state.failing_subscribes > 0 {
            state.failing_subscribes -= 1;
            return Err(DumpError::Unavailable("fake collector refused watch".to_string()));
        }
        let (tx, rx) = mpsc::channel(16);
        state.subscribers.insert(path.clone(), tx);
        Ok(ProgressSubscription::new(rx, None))
    }
}
