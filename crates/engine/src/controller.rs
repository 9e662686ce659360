// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service controller: the top-level control surface.
//!
//! Admits jobs under a concurrency limit, evicting the oldest active job
//! when the limit is reached, and keeps the per-job controls in admission
//! order until each job's completion callback removes it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sj_adapters::DumpAdapter;
use sj_core::{job_id_for, Clock, ContentHasher, JobId, JobOutcome, JobSpec};
use tracing::{debug, error, info, warn};

use crate::bus::ObjectServer;
use crate::control::JobControl;
use crate::runner::{CompletionCallback, JobRunner};

struct ActiveJob<D: DumpAdapter> {
    ticket: u64,
    control: JobControl<D>,
}

type Registry<D> = Arc<Mutex<VecDeque<ActiveJob<D>>>>;

/// Entry point for `list_active`, `start` and `cancel`.
pub struct ServiceController<D: DumpAdapter, C: Clock> {
    runner: JobRunner<D>,
    bus: ObjectServer,
    hasher: Arc<dyn ContentHasher>,
    clock: C,
    max_active: usize,
    registry: Registry<D>,
    tickets: Arc<AtomicU64>,
}

impl<D: DumpAdapter, C: Clock> Clone for ServiceController<D, C> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            bus: self.bus.clone(),
            hasher: Arc::clone(&self.hasher),
            clock: self.clock.clone(),
            max_active: self.max_active,
            registry: Arc::clone(&self.registry),
            tickets: Arc::clone(&self.tickets),
        }
    }
}

impl<D: DumpAdapter, C: Clock> ServiceController<D, C> {
    pub fn new(
        runner: JobRunner<D>,
        bus: ObjectServer,
        hasher: Arc<dyn ContentHasher>,
        clock: C,
    ) -> Self {
        let max_active = runner.config().max_active.max(1);
        Self {
            runner,
            bus,
            hasher,
            clock,
            max_active,
            registry: Arc::new(Mutex::new(VecDeque::new())),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn runner(&self) -> &JobRunner<D> {
        &self.runner
    }

    pub fn bus(&self) -> &ObjectServer {
        &self.bus
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }

    /// IDs of active jobs, oldest first.
    pub fn list_active(&self) -> Vec<JobId> {
        self.registry.lock().iter().map(|job| job.control.id().clone()).collect()
    }

    /// Admit and start a job. Returns false when it could not be started;
    /// nothing stays registered in that case.
    pub async fn start(&self, script: String, timeout_secs: u64, dump_needed: bool) -> bool {
        self.evict_for_admission();

        let id = match job_id_for(self.hasher.as_ref(), &self.clock, &script) {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "failed to derive job ID");
                return false;
            }
        };
        let control =
            match JobControl::publish(id.clone(), timeout_secs, self.runner.clone(), self.bus.clone()) {
                Ok(control) => control,
                Err(e) => {
                    warn!(job_id = %id, error = %e, "failed to publish job control");
                    return false;
                }
            };

        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        self.registry.lock().push_back(ActiveJob { ticket, control });

        let spec = JobSpec::new(id.clone(), script)
            .timeout_secs(timeout_secs)
            .dump_needed(dump_needed);
        let registry = Arc::clone(&self.registry);
        let on_complete: CompletionCallback =
            Box::new(move |outcome, id| finish(&registry, ticket, outcome, id));

        if !self.runner.run(spec, on_complete).await {
            // Dropping the control unpublishes it
            remove_ticket(&self.registry, ticket);
            return false;
        }

        if let Some(job) = self.registry.lock().iter_mut().find(|job| job.ticket == ticket) {
            job.control.start_timeout();
        }
        info!(job_id = %id, timeout_secs, dump_needed, "job admitted");
        true
    }

    /// Cancel the active job `id`. False when it is not active.
    pub fn cancel(&self, id: &JobId) -> bool {
        let registry = self.registry.lock();
        match registry.iter().find(|job| job.control.id() == id) {
            Some(job) => job.control.cancel(),
            None => {
                debug!(job_id = %id, "cancel for inactive job");
                false
            }
        }
    }

    /// Terminate all jobs and drop every control.
    pub async fn shutdown(&self) {
        self.runner.shutdown().await;
        let remaining: Vec<_> = self.registry.lock().drain(..).collect();
        drop(remaining);
    }

    /// Pop and cancel the oldest jobs until a slot is free.
    fn evict_for_admission(&self) {
        let evicted: Vec<ActiveJob<D>> = {
            let mut registry = self.registry.lock();
            let mut evicted = Vec::new();
            while registry.len() >= self.max_active {
                match registry.pop_front() {
                    Some(job) => evicted.push(job),
                    None => break,
                }
            }
            evicted
        };
        for job in evicted {
            info!(job_id = %job.control.id(), "evicting oldest active job");
            job.control.cancel();
        }
    }
}

fn remove_ticket<D: DumpAdapter>(registry: &Registry<D>, ticket: u64) -> Option<ActiveJob<D>> {
    let mut registry = registry.lock();
    let index = registry.iter().position(|job| job.ticket == ticket)?;
    registry.remove(index)
}

fn finish<D: DumpAdapter>(registry: &Registry<D>, ticket: u64, outcome: JobOutcome, id: JobId) {
    match remove_ticket(registry, ticket) {
        Some(job) => {
            job.control.mark_completed();
            info!(job_id = %id, %outcome, "job released");
        }
        None => debug!(job_id = %id, %outcome, "finished job was already evicted"),
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
