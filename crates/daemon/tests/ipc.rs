// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives a real daemon listener over its Unix socket.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sj_adapters::{FakeDumpAdapter, FakeDumpCall, ProgressUpdate};
use sj_core::{JobId, ObjectPath};
use sj_daemon::{startup, Config, DaemonState, ListenCtx, Listener, StartupResult};
use sj_wire::{read_frame, write_frame, Request, Response};
use tempfile::TempDir;
use tokio::net::UnixStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Daemon {
    _dir: TempDir,
    socket: PathBuf,
    work_root: PathBuf,
    state: DaemonState<FakeDumpAdapter>,
    adapter: FakeDumpAdapter,
    shutdown: Arc<Notify>,
    listener: JoinHandle<()>,
}

impl Daemon {
    async fn start(max_active: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_state_dir(dir.path().join("state"));
        config.engine = config.engine.clone().work_root(dir.path().join("work")).max_active(max_active);
        config.dump.retry_backoff = Duration::ZERO;

        let adapter = FakeDumpAdapter::new();
        let StartupResult { daemon, listener } = startup(&config, adapter.clone()).await.unwrap();
        let shutdown = Arc::new(Notify::new());
        let ctx = Arc::new(ListenCtx {
            controller: daemon.controller.clone(),
            start_time: daemon.start_time,
            shutdown: Arc::clone(&shutdown),
            ipc_timeout: Duration::from_secs(5),
        });
        let listener = tokio::spawn(Listener::new(listener, ctx).run());

        Self {
            socket: config.socket_path.clone(),
            work_root: config.engine.work_root.clone(),
            _dir: dir,
            state: daemon,
            adapter,
            shutdown,
            listener,
        }
    }

    async fn request(&self, request: Request) -> Response {
        let mut stream = UnixStream::connect(&self.socket).await.unwrap();
        write_frame(&mut stream, &request).await.unwrap();
        read_frame(&mut stream).await.unwrap()
    }

    async fn start_job(&self, script: &str, timeout_secs: u64, dump_needed: bool) -> bool {
        let request = Request::Start { script: script.to_string(), timeout_secs, dump_needed };
        match self.request(request).await {
            Response::Started { ok } => ok,
            other => panic!("expected Started, got {other:?}"),
        }
    }

    async fn active(&self) -> Vec<JobId> {
        match self.request(Request::ListActive).await {
            Response::Active { ids } => ids,
            other => panic!("expected Active, got {other:?}"),
        }
    }

    async fn stop(mut self) {
        self.listener.abort();
        self.state.shutdown().await.unwrap();
    }
}

async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {what}");
}

fn job_dir(work_root: &Path, id: &JobId) -> PathBuf {
    work_root.join(id.as_str())
}

#[tokio::test]
async fn ping_and_status() {
    let daemon = Daemon::start(2).await;

    assert_eq!(daemon.request(Request::Ping).await, Response::Pong);
    match daemon.request(Request::Status).await {
        Response::Status { active, max_active, pending_dumps, .. } => {
            assert_eq!((active, max_active, pending_dumps), (0, 2, 0));
        }
        other => panic!("expected Status, got {other:?}"),
    }

    daemon.stop().await;
}

#[tokio::test]
async fn echo_job_runs_and_reclaims_storage() {
    let daemon = Daemon::start(1).await;

    assert!(daemon.start_job("echo hi", 0, false).await);

    wait_until("job to finish", || daemon.state.controller.list_active().is_empty()).await;
    let leftovers = std::fs::read_dir(&daemon.work_root).unwrap().count();
    assert_eq!(leftovers, 0);
    assert!(daemon.active().await.is_empty());

    daemon.stop().await;
}

#[tokio::test]
async fn second_start_evicts_the_first() {
    let daemon = Daemon::start(1).await;

    assert!(daemon.start_job("sleep 30; echo one", 0, false).await);
    let first = daemon.active().await;
    assert!(daemon.start_job("sleep 30; echo two", 0, false).await);
    let second = daemon.active().await;

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);

    daemon.stop().await;
}

#[tokio::test]
async fn cancel_through_job_object() {
    let daemon = Daemon::start(1).await;

    assert!(daemon.start_job("sleep 30", 0, false).await);
    let id = daemon.active().await.remove(0);
    let path = ObjectPath::for_job(&id);

    match daemon.request(Request::Objects).await {
        Response::Objects { paths } => assert!(paths.contains(&path)),
        other => panic!("expected Objects, got {other:?}"),
    }

    let call = Request::Call { path: path.clone(), method: "cancel".to_string() };
    assert_eq!(daemon.request(call).await, Response::Reply { ok: true });

    wait_until("job to be released", || daemon.state.controller.list_active().is_empty()).await;
    assert!(!daemon.state.controller.bus().is_published(&path));
    assert_eq!(daemon.request(Request::Cancel { id }).await, Response::Cancelled { ok: false });

    daemon.stop().await;
}

#[tokio::test]
async fn timeout_cancels_long_job() {
    let daemon = Daemon::start(1).await;

    assert!(daemon.start_job("sleep 30", 1, false).await);
    wait_until("timeout to fire", || daemon.state.controller.list_active().is_empty()).await;

    daemon.stop().await;
}

#[tokio::test]
async fn dump_job_keeps_storage_until_bundle_completes() {
    let daemon = Daemon::start(1).await;

    assert!(daemon.start_job("echo dumped", 0, true).await);

    let adapter = daemon.adapter.clone();
    wait_until("bundle subscription", || {
        adapter.calls().iter().any(|call| matches!(call, FakeDumpCall::Subscribe(_)))
    })
    .await;
    wait_until("job to be released", || daemon.state.controller.list_active().is_empty()).await;

    let bundles = daemon.state.controller.runner().dumps().pending_bundles();
    assert_eq!(bundles.len(), 1);
    let dir = job_dir(&daemon.work_root, &bundles[0].1);
    let output = std::fs::read_to_string(dir.join(format!("{}.out", bundles[0].1))).unwrap();
    assert_eq!(output, "dumped\n");

    let path = adapter
        .calls()
        .into_iter()
        .find_map(|call| match call {
            FakeDumpCall::Subscribe(path) => Some(path),
            FakeDumpCall::Create => None,
        })
        .unwrap();
    assert!(adapter.notify(&path, ProgressUpdate::status("Completed")).await);

    wait_until("storage reclaim", || !dir.exists()).await;
    let dumps = daemon.state.controller.runner().dumps().clone();
    wait_until("bundle record removal", || dumps.pending() == 0).await;

    daemon.stop().await;
}

#[tokio::test]
async fn shutdown_request_notifies_main_loop() {
    let daemon = Daemon::start(1).await;
    let notified = Arc::clone(&daemon.shutdown);
    let wait = tokio::spawn(async move { notified.notified().await });

    assert_eq!(daemon.request(Request::Shutdown).await, Response::ShuttingDown);
    tokio::time::timeout(Duration::from_secs(2), wait).await.unwrap().unwrap();

    daemon.stop().await;
}
