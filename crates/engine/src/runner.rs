// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job runner: executes admitted jobs and reports how they ended.
//!
//! `run` writes the script to working storage, spawns it and hands the
//! process to a background execution task. The task captures output,
//! optionally requests a diagnostic bundle, reclaims storage and finally
//! invokes the completion callback. Live jobs are tracked in a table keyed
//! by job ID; an entry exists from `run` until the completion callback
//! fires, including while a diagnostic bundle is being requested.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use sj_adapters::{spawn_script, DumpAdapter, ExitReport, ProcessError, ScriptProcess};
use sj_core::{JobId, JobOutcome, JobSpec};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::{DumpConfig, EngineConfig};
use crate::dump::DumpWorkflow;
use crate::storage::WorkDir;

/// Invoked exactly once per successfully started job.
pub type CompletionCallback = Box<dyn FnOnce(JobOutcome, JobId) + Send + 'static>;

/// Errors from starting a job
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("job {0} is already running")]
    AlreadyRunning(JobId),

    #[error("failed to write script for job {id}: {source}")]
    Storage {
        id: JobId,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Spawn(#[from] ProcessError),
}

/// Executes jobs and owns the live-job table.
#[derive(Clone)]
pub struct JobRunner<D> {
    config: Arc<EngineConfig>,
    dumps: DumpWorkflow<D>,
    jobs: Arc<Mutex<HashMap<JobId, CancellationToken>>>,
    tasks: TaskTracker,
}

impl<D: DumpAdapter> JobRunner<D> {
    pub fn new(config: EngineConfig, adapter: D, dump_config: DumpConfig) -> Self {
        Self {
            config: Arc::new(config),
            dumps: DumpWorkflow::new(adapter, dump_config),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            tasks: TaskTracker::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dumps(&self) -> &DumpWorkflow<D> {
        &self.dumps
    }

    /// Whether `id` is still held by the runner, either running or waiting
    /// for its diagnostic bundle request.
    pub fn is_running(&self, id: &JobId) -> bool {
        self.jobs.lock().contains_key(id)
    }

    /// Number of jobs not yet completed.
    pub fn running(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Start `spec`. Returns false when the script could not be written or
    /// spawned; every later outcome is delivered through `on_complete`.
    ///
    /// A spawn failure also reports [`JobOutcome::Aborted`] through
    /// `on_complete` before returning false.
    pub async fn run(&self, spec: JobSpec, on_complete: CompletionCallback) -> bool {
        let id = spec.id.clone();
        let workdir = WorkDir::new(&self.config.work_root, &id);
        let cancel = CancellationToken::new();

        let process = match self.launch(&spec, &workdir, &cancel).await {
            Ok(process) => process,
            Err(e) => {
                error!(job_id = %id, error = %e, "failed to start job");
                if !matches!(e, RunnerError::AlreadyRunning(_)) {
                    self.jobs.lock().remove(&id);
                    reclaim(&id, &workdir).await;
                }
                if matches!(e, RunnerError::Spawn(_)) {
                    on_complete(JobOutcome::Aborted { reason: e.to_string() }, id);
                }
                return false;
            }
        };

        info!(job_id = %id, pid = ?process.id(), dump = spec.dump_needed, "job started");
        let runner = self.clone();
        self.tasks.spawn(runner.execute(spec, workdir, process, cancel, on_complete));
        true
    }

    /// Request termination of the job running under `id`. While the job
    /// waits for its diagnostic bundle this abandons the request instead.
    ///
    /// Returns false when no such job is held or it is already being
    /// terminated.
    pub fn cancel(&self, id: &JobId) -> bool {
        let jobs = self.jobs.lock();
        match jobs.get(id) {
            Some(token) if !token.is_cancelled() => {
                info!(job_id = %id, "cancelling job");
                token.cancel();
                true
            }
            Some(_) => {
                debug!(job_id = %id, "job already being cancelled");
                false
            }
            None => false,
        }
    }

    /// Terminate every live job and stop waiting on diagnostic bundles.
    /// Waits for the execution tasks to finish their cleanup.
    pub async fn shutdown(&self) {
        // Stop the workflow first so abandoned bundle requests keep storage
        self.dumps.shutdown();
        let live: Vec<JobId> = {
            let jobs = self.jobs.lock();
            for token in jobs.values() {
                token.cancel();
            }
            jobs.keys().cloned().collect()
        };
        if !live.is_empty() {
            info!(count = live.len(), "terminating live jobs");
        }
        self.tasks.close();
        self.tasks.wait().await;
    }

    async fn launch(
        &self,
        spec: &JobSpec,
        workdir: &WorkDir,
        cancel: &CancellationToken,
    ) -> Result<ScriptProcess, RunnerError> {
        {
            let mut jobs = self.jobs.lock();
            if jobs.contains_key(&spec.id) {
                return Err(RunnerError::AlreadyRunning(spec.id.clone()));
            }
            jobs.insert(spec.id.clone(), cancel.clone());
        }
        workdir
            .write_script(&spec.script)
            .await
            .map_err(|source| RunnerError::Storage { id: spec.id.clone(), source })?;
        Ok(spawn_script(&self.config.shell, workdir.script_path(), workdir.dir())?)
    }

    async fn execute(
        self,
        spec: JobSpec,
        workdir: WorkDir,
        process: ScriptProcess,
        cancel: CancellationToken,
        on_complete: CompletionCallback,
    ) {
        let id = spec.id;
        let outcome = match capture(&workdir, process, &cancel).await {
            Ok(report) => outcome_of(&report),
            Err(e) => {
                error!(job_id = %id, error = %e, "job execution failed");
                JobOutcome::Aborted { reason: e.to_string() }
            }
        };
        info!(job_id = %id, %outcome, "job finished");

        if spec.dump_needed {
            // A fresh token lets `cancel` abandon the bundle request
            let abort = CancellationToken::new();
            self.jobs.lock().insert(id.clone(), abort.clone());
            if self.dumps.begin(&id, workdir.clone(), &abort).await.is_none() {
                warn!(job_id = %id, "no diagnostic bundle for job");
                if abort.is_cancelled() && !self.dumps.is_stopped() {
                    reclaim(&id, &workdir).await;
                }
            }
        } else {
            reclaim(&id, &workdir).await;
        }

        self.jobs.lock().remove(&id);
        on_complete(outcome, id);
    }
}

/// Stream the process output into `<id>.out`, then append the exit
/// diagnostic for an unsuccessful exit.
async fn capture(
    workdir: &WorkDir,
    process: ScriptProcess,
    cancel: &CancellationToken,
) -> Result<ExitReport, ProcessError> {
    let mut out = workdir.create_output().await?;
    let report = process.run_to_end(&mut out, cancel).await?;
    if let Some(line) = report.diagnostic() {
        out.write_all(format!("{line}\n").as_bytes()).await?;
        out.flush().await?;
    }
    Ok(report)
}

fn outcome_of(report: &ExitReport) -> JobOutcome {
    match (report.terminated, report.code, report.signal) {
        (true, _, _) => JobOutcome::Cancelled,
        (false, Some(code), _) => JobOutcome::Completed { exit_code: code },
        // Killed from outside: report it the way a shell would
        (false, None, signal) => JobOutcome::Completed { exit_code: 128 + signal.unwrap_or(0) },
    }
}

async fn reclaim(id: &JobId, workdir: &WorkDir) {
    if let Err(e) = workdir.reclaim().await {
        error!(job_id = %id, path = %workdir.dir().display(), error = %e, "failed to remove working storage");
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
