// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Job lifecycle engine: admission, execution, timeouts, cancellation and
//! the post-job diagnostic bundle workflow.

pub mod bus;
pub mod config;
pub mod control;
pub mod controller;
pub mod dump;
pub mod runner;
pub mod storage;

pub use bus::{BusError, BusObject, ObjectServer};
pub use config::{DumpConfig, EngineConfig};
pub use control::{ControlState, JobControl, JOB_INTERFACE};
pub use controller::ServiceController;
pub use dump::{DumpRecord, DumpWorkflow};
pub use runner::{CompletionCallback, JobRunner, RunnerError};
pub use storage::WorkDir;
