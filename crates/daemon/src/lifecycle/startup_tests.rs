// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use sj_adapters::FakeDumpAdapter;
use tempfile::tempdir;

use super::*;

fn test_config(dir: &Path) -> Config {
    let mut config = Config::for_state_dir(dir.join("state"));
    config.engine = config.engine.clone().work_root(dir.join("work"));
    config
}

#[tokio::test]
async fn startup_creates_files_and_binds_socket() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config, FakeDumpAdapter::new()).await.unwrap();

    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(std::fs::read_to_string(&config.version_path).unwrap(), PROTOCOL_VERSION);
    assert!(config.socket_path.exists());
    assert!(config.engine.work_root.is_dir());
    assert!(result.daemon.controller.list_active().is_empty());
    assert_eq!(result.daemon.controller.max_active(), 1);
}

#[tokio::test]
async fn shutdown_removes_runtime_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let StartupResult { mut daemon, listener } = startup(&config, FakeDumpAdapter::new()).await.unwrap();
    drop(listener);
    daemon.shutdown().await.unwrap();

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
}

#[tokio::test]
async fn startup_lock_failed_does_not_remove_existing_files() {
    // Simulate a running daemon by holding the lock and creating its files.
    // A second startup attempt must fail without deleting anything.
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();

    std::fs::write(&config.socket_path, b"").unwrap();
    std::fs::write(&config.version_path, b"0.1.0").unwrap();

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"12345").unwrap();

    match startup(&config, FakeDumpAdapter::new()).await {
        Err(LifecycleError::LockFailed(_)) => {}
        Err(e) => panic!("expected LockFailed, got: {e}"),
        Ok(_) => panic!("expected LockFailed, but startup succeeded"),
    }

    assert!(config.socket_path.exists(), "socket file must not be deleted on LockFailed");
    assert!(config.version_path.exists(), "version file must not be deleted on LockFailed");
    assert!(config.lock_path.exists(), "lock file must not be deleted on LockFailed");
}

#[test]
fn lock_file_not_truncated_before_lock_acquired() {
    let dir = tempdir().unwrap();
    let lock_path = dir.path().join("test.lock");

    let running_lock = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .unwrap();
    running_lock.lock_exclusive().unwrap();
    let mut f = &running_lock;
    writeln!(f, "99999").unwrap();

    // Second process opens the file the way startup_inner does
    let _second = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .unwrap();

    let content = std::fs::read_to_string(&lock_path).unwrap();
    assert_eq!(content.trim(), "99999", "lock file content must not be truncated by another open");
}

#[tokio::test]
async fn failed_startup_cleans_up_created_files() {
    // The work root is a regular file, so startup fails after the lock,
    // PID and version files were written.
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    config.engine = config.engine.clone().work_root(blocker.join("work"));

    let err = startup(&config, FakeDumpAdapter::new()).await.err().unwrap();
    assert!(matches!(err, LifecycleError::Io(_)), "got {err}");

    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
    assert!(!config.socket_path.exists());
}
