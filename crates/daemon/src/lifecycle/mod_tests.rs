// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serial_test::serial;
use sj_adapters::FakeDumpAdapter;

use super::*;
use crate::config::{DumpSection, EngineSection};

fn clear_env() {
    for var in ["SJ_MAX_ACTIVE", "SJ_WORK_ROOT", "SJ_DUMP_SOCKET", "SJ_DUMP_RETRY_MS"] {
        std::env::remove_var(var);
    }
}

fn file_config() -> FileConfig {
    FileConfig {
        engine: EngineSection {
            max_active: Some(4),
            work_root: Some(PathBuf::from("/srv/jobs")),
            shell: Some(PathBuf::from("/bin/sh")),
        },
        dump: DumpSection {
            socket: Some(PathBuf::from("/run/collector.sock")),
            retry_secs: Some(7),
        },
    }
}

#[test]
fn for_state_dir_places_files_under_state_dir() {
    let config = Config::for_state_dir("/state");
    assert_eq!(config.socket_path, Path::new("/state/daemon.sock"));
    assert_eq!(config.lock_path, Path::new("/state/daemon.pid"));
    assert_eq!(config.version_path, Path::new("/state/daemon.version"));
    assert_eq!(config.log_path, Path::new("/state/daemon.log"));
    assert_eq!(config.config_path, Path::new("/state/config.toml"));
    assert_eq!(config.dump_socket, Path::new("/state/collector.sock"));
    assert_eq!(config.engine, EngineConfig::default());
    assert_eq!(config.dump, DumpConfig::default());
}

#[test]
#[serial]
fn resolve_without_file_or_env_uses_defaults() {
    clear_env();
    let config = Config::resolve(PathBuf::from("/state"), &FileConfig::default());
    assert_eq!(config, Config::for_state_dir("/state"));
}

#[test]
#[serial]
fn resolve_applies_file_settings() {
    clear_env();
    let config = Config::resolve(PathBuf::from("/state"), &file_config());
    assert_eq!(config.engine.max_active, 4);
    assert_eq!(config.engine.work_root, Path::new("/srv/jobs"));
    assert_eq!(config.engine.shell, Path::new("/bin/sh"));
    assert_eq!(config.dump_socket, Path::new("/run/collector.sock"));
    assert_eq!(config.dump.retry_backoff, Duration::from_secs(7));
}

#[test]
#[serial]
fn environment_overrides_file() {
    clear_env();
    std::env::set_var("SJ_MAX_ACTIVE", "2");
    std::env::set_var("SJ_WORK_ROOT", "/tmp/override");
    std::env::set_var("SJ_DUMP_SOCKET", "/tmp/collector.sock");
    std::env::set_var("SJ_DUMP_RETRY_MS", "1500");

    let config = Config::resolve(PathBuf::from("/state"), &file_config());
    clear_env();

    assert_eq!(config.engine.max_active, 2);
    assert_eq!(config.engine.work_root, Path::new("/tmp/override"));
    assert_eq!(config.engine.shell, Path::new("/bin/sh"));
    assert_eq!(config.dump_socket, Path::new("/tmp/collector.sock"));
    assert_eq!(config.dump.retry_backoff, Duration::from_millis(1500));
}

#[test]
#[serial]
fn zero_max_active_is_clamped() {
    clear_env();
    std::env::set_var("SJ_MAX_ACTIVE", "0");
    let config = Config::resolve(PathBuf::from("/state"), &FileConfig::default());
    clear_env();
    assert_eq!(config.engine.max_active, 1);
}

#[tokio::test]
async fn start_script_runs_with_startup_timeout_and_dump() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::for_state_dir(dir.path().join("state"));
    config.engine = config.engine.clone().work_root(dir.path().join("work"));
    config.dump.retry_backoff = Duration::ZERO;

    let adapter = FakeDumpAdapter::new();
    let StartupResult { mut daemon, listener } = startup(&config, adapter.clone()).await.unwrap();
    drop(listener);

    assert!(daemon.start_script("sleep 10".to_string()).await);
    let active = daemon.controller.list_active();
    assert_eq!(active.len(), 1);

    daemon.shutdown().await.unwrap();
    assert!(daemon.controller.list_active().is_empty());
}
