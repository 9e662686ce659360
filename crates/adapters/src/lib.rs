// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapters for external I/O: child processes and the diagnostic collector.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod dump;
pub mod process;

pub use dump::{
    DumpAdapter, DumpError, ProgressSubscription, ProgressUpdate, SocketDumpAdapter,
    PROGRESS_INTERFACE, STATUS_PROPERTY,
};
pub use process::{spawn_script, ExitReport, ProcessError, ScriptProcess};

#[cfg(any(test, feature = "test-support"))]
pub use dump::{FakeDumpAdapter, FakeDumpCall};
