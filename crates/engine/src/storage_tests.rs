// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tempfile::tempdir;
use tokio::io::AsyncWriteExt;

use super::*;

#[test]
fn layout_is_named_after_job() {
    let id = JobId::new("0123456789abcdef");
    let dir = WorkDir::new(Path::new("/tmp/sj"), &id);
    assert_eq!(dir.dir(), Path::new("/tmp/sj/0123456789abcdef"));
    assert_eq!(dir.script_path(), Path::new("/tmp/sj/0123456789abcdef/0123456789abcdef.sh"));
    assert_eq!(dir.output_path(), Path::new("/tmp/sj/0123456789abcdef/0123456789abcdef.out"));
}

#[tokio::test]
async fn write_script_creates_directory_lazily() {
    let root = tempdir().unwrap();
    let dir = WorkDir::new(root.path(), &JobId::new("abc"));
    assert!(!dir.exists());

    dir.write_script("echo hi\n").await.unwrap();

    assert!(dir.exists());
    assert_eq!(std::fs::read_to_string(dir.script_path()).unwrap(), "echo hi\n");
}

#[tokio::test]
async fn reclaim_removes_everything_and_tolerates_missing() {
    let root = tempdir().unwrap();
    let dir = WorkDir::new(root.path(), &JobId::new("abc"));
    dir.write_script("true\n").await.unwrap();
    let mut out = dir.create_output().await.unwrap();
    out.write_all(b"captured\n").await.unwrap();
    out.flush().await.unwrap();
    drop(out);

    dir.reclaim().await.unwrap();
    assert!(!dir.exists());

    dir.reclaim().await.unwrap();
}
