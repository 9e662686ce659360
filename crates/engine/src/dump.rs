// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-job diagnostic bundle workflow.
//!
//! After a job that asked for a dump finishes, the workflow asks the
//! collector for a bundle, retrying with a fixed backoff until the request
//! succeeds. It then watches the bundle's progress and reclaims the job's
//! working storage once the bundle reports completion. Waiting bundles are
//! tracked as [`DumpRecord`]s keyed by bundle ID.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sj_adapters::{DumpAdapter, ProgressSubscription, ProgressUpdate, PROGRESS_INTERFACE};
use sj_core::{JobId, ObjectPath};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::DumpConfig;
use crate::storage::WorkDir;

/// A bundle whose completion is still awaited.
pub struct DumpRecord {
    pub job_id: JobId,
    pub bundle_id: String,
    pub path: ObjectPath,
    watcher: JoinHandle<()>,
}

impl std::fmt::Debug for DumpRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpRecord")
            .field("job_id", &self.job_id)
            .field("bundle_id", &self.bundle_id)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

type Records = Arc<Mutex<HashMap<String, DumpRecord>>>;

/// Drives `create_dump` retries and bundle watchers.
#[derive(Clone)]
pub struct DumpWorkflow<D> {
    adapter: D,
    config: DumpConfig,
    records: Records,
    stop: CancellationToken,
}

impl<D: DumpAdapter> DumpWorkflow<D> {
    pub fn new(adapter: D, config: DumpConfig) -> Self {
        Self {
            adapter,
            config,
            records: Arc::new(Mutex::new(HashMap::new())),
            stop: CancellationToken::new(),
        }
    }

    pub fn adapter(&self) -> &D {
        &self.adapter
    }

    /// Number of bundles still being watched.
    pub fn pending(&self) -> usize {
        self.records.lock().len()
    }

    /// Bundle IDs still being watched, with the job each belongs to.
    pub fn pending_bundles(&self) -> Vec<(String, JobId)> {
        let mut bundles: Vec<_> = self
            .records
            .lock()
            .values()
            .map(|r| (r.bundle_id.clone(), r.job_id.clone()))
            .collect();
        bundles.sort();
        bundles
    }

    /// Request a bundle for `job_id` and start watching it.
    ///
    /// Returns once the bundle exists and its progress subscription is
    /// live; `workdir` is reclaimed later by the watcher. Returns `None`
    /// when `abort` fired or the workflow was shut down before a bundle was
    /// created, or when the subscription could not be established.
    pub async fn begin(
        &self,
        job_id: &JobId,
        workdir: WorkDir,
        abort: &CancellationToken,
    ) -> Option<String> {
        let path = self.create_with_retry(job_id, abort).await?;
        let bundle_id = path.last_segment().unwrap_or(path.as_str()).to_string();

        let subscription = match self.adapter.subscribe(&path).await {
            Ok(subscription) => subscription,
            Err(e) => {
                error!(job_id = %job_id, %bundle_id, error = %e, "failed to watch diagnostic bundle");
                return None;
            }
        };
        info!(job_id = %job_id, %bundle_id, "waiting for diagnostic bundle");

        let mut records = self.records.lock();
        let watcher = tokio::spawn(watch_bundle(
            Arc::clone(&self.records),
            bundle_id.clone(),
            job_id.clone(),
            workdir,
            subscription,
        ));
        let record = DumpRecord { job_id: job_id.clone(), bundle_id: bundle_id.clone(), path, watcher };
        if let Some(previous) = records.insert(bundle_id.clone(), record) {
            warn!(%bundle_id, job_id = %previous.job_id, "replacing watcher for reused bundle ID");
            previous.watcher.abort();
        }
        Some(bundle_id)
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Stop retry loops and drop every bundle watcher. Working storage of
    /// bundles still in flight is left in place.
    pub fn shutdown(&self) {
        self.stop.cancel();
        let records: Vec<DumpRecord> = self.records.lock().drain().map(|(_, r)| r).collect();
        for record in records {
            debug!(bundle_id = %record.bundle_id, "abandoning diagnostic bundle watch");
            record.watcher.abort();
        }
    }

    async fn create_with_retry(
        &self,
        job_id: &JobId,
        abort: &CancellationToken,
    ) -> Option<ObjectPath> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let result = tokio::select! {
                _ = self.stop.cancelled() => return None,
                _ = abort.cancelled() => {
                    info!(job_id = %job_id, attempt, "diagnostic bundle request abandoned");
                    return None;
                }
                result = self.adapter.create_dump() => result,
            };
            match result {
                Ok(path) => {
                    info!(job_id = %job_id, %path, attempt, "diagnostic bundle requested");
                    return Some(path);
                }
                Err(e) => {
                    warn!(
                        job_id = %job_id,
                        attempt,
                        error = %e,
                        retry_in = ?self.config.retry_backoff,
                        "create_dump failed"
                    );
                    tokio::select! {
                        _ = self.stop.cancelled() => return None,
                        _ = abort.cancelled() => {
                            info!(job_id = %job_id, attempt, "diagnostic bundle request abandoned");
                            return None;
                        }
                        _ = tokio::time::sleep(self.config.retry_backoff) => {}
                    }
                }
            }
        }
    }
}

/// Only a completed status on the progress interface finishes a bundle.
fn completes_bundle(update: &ProgressUpdate) -> bool {
    update.interface == PROGRESS_INTERFACE && update.is_completed()
}

async fn watch_bundle(
    records: Records,
    bundle_id: String,
    job_id: JobId,
    workdir: WorkDir,
    mut subscription: ProgressSubscription,
) {
    let mut completed = false;
    while let Some(update) = subscription.next().await {
        if completes_bundle(&update) {
            completed = true;
            break;
        }
        debug!(
            %bundle_id,
            interface = %update.interface,
            status = ?update.status_value(),
            "diagnostic bundle progress"
        );
    }

    if completed {
        subscription.unsubscribe();
        info!(job_id = %job_id, %bundle_id, "diagnostic bundle completed");
        if let Err(e) = workdir.reclaim().await {
            error!(job_id = %job_id, path = %workdir.dir().display(), error = %e, "failed to remove working storage");
        }
    } else {
        warn!(job_id = %job_id, %bundle_id, "progress watch closed before bundle completed");
    }

    let mut table = records.lock();
    if table.get(&bundle_id).is_some_and(|r| r.job_id == job_id) {
        table.remove(&bundle_id);
    }
}

#[cfg(test)]
#[path = "dump_tests.rs"]
mod tests;
