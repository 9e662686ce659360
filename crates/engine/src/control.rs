// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job remote control.
//!
//! A [`JobControl`] publishes the job's `cancel` method on the bus and owns
//! the job's one-shot timeout timer. Dropping it aborts the timer, then
//! unpublishes the bus object, then cancels the job unless it already
//! completed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sj_adapters::DumpAdapter;
use sj_core::{JobId, ObjectPath};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bus::{BusError, BusObject, ObjectServer};
use crate::runner::JobRunner;

/// Interface of per-job bus objects.
pub const JOB_INTERFACE: &str = "sj.Job";

/// Where a job's control stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Armed,
    Cancelled,
    TimedOut,
    Completed,
}

sj_core::simple_display! {
    ControlState {
        Armed => "armed",
        Cancelled => "cancelled",
        TimedOut => "timed_out",
        Completed => "completed",
    }
}

struct ControlInner<D> {
    id: JobId,
    runner: JobRunner<D>,
    state: Mutex<ControlState>,
}

impl<D: DumpAdapter> ControlInner<D> {
    /// Ask the runner to cancel; on success record why.
    fn cancel(&self, reason: ControlState) -> bool {
        let cancelled = self.runner.cancel(&self.id);
        if cancelled {
            let mut state = self.state.lock();
            if *state == ControlState::Armed {
                *state = reason;
            }
        }
        cancelled
    }
}

/// The object published at `/sj/jobs/<id>`.
struct JobControlObject<D> {
    inner: Arc<ControlInner<D>>,
}

impl<D: DumpAdapter> BusObject for JobControlObject<D> {
    fn interface(&self) -> &'static str {
        JOB_INTERFACE
    }

    fn call(&self, method: &str) -> Result<bool, BusError> {
        match method {
            "cancel" => Ok(self.inner.cancel(ControlState::Cancelled)),
            other => Err(BusError::UnknownMethod {
                interface: JOB_INTERFACE,
                method: other.to_string(),
            }),
        }
    }
}

/// Remote-control handle of one active job.
pub struct JobControl<D: DumpAdapter> {
    inner: Arc<ControlInner<D>>,
    timeout_secs: u64,
    path: ObjectPath,
    bus: ObjectServer,
    timer: Option<JoinHandle<()>>,
}

impl<D: DumpAdapter> JobControl<D> {
    /// Create the control and publish it on `bus`.
    pub fn publish(
        id: JobId,
        timeout_secs: u64,
        runner: JobRunner<D>,
        bus: ObjectServer,
    ) -> Result<Self, BusError> {
        let path = ObjectPath::for_job(&id);
        let inner = Arc::new(ControlInner { id, runner, state: Mutex::new(ControlState::Armed) });
        bus.publish(path.clone(), Arc::new(JobControlObject { inner: Arc::clone(&inner) }))?;
        Ok(Self { inner, timeout_secs, path, bus, timer: None })
    }

    pub fn id(&self) -> &JobId {
        &self.inner.id
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub fn state(&self) -> ControlState {
        *self.inner.state.lock()
    }

    /// Whether a timeout timer is pending.
    pub fn timer_armed(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Arm the timeout timer. No-op for a zero timeout.
    pub fn start_timeout(&mut self) {
        if self.timeout_secs == 0 {
            return;
        }
        if let Some(previous) = self.timer.take() {
            previous.abort();
        }
        let inner = Arc::clone(&self.inner);
        let after = Duration::from_secs(self.timeout_secs);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            warn!(job_id = %inner.id, timeout_secs = after.as_secs(), "job timed out");
            inner.cancel(ControlState::TimedOut);
        }));
    }

    /// Cancel the job. False when it already finished or is being cancelled.
    pub fn cancel(&self) -> bool {
        self.inner.cancel(ControlState::Cancelled)
    }

    /// Record that the job finished on its own.
    pub fn mark_completed(&self) {
        let mut state = self.inner.state.lock();
        if *state == ControlState::Armed {
            *state = ControlState::Completed;
        }
    }
}

impl<D: DumpAdapter> Drop for JobControl<D> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.bus.unpublish(&self.path);
        if self.state() != ControlState::Completed && self.inner.runner.cancel(&self.inner.id) {
            info!(job_id = %self.inner.id, "cancelled job on control release");
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
