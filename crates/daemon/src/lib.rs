// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script jobs daemon library
//!
//! Lifecycle, configuration and the socket listener used by `sjd`; the
//! CLI reuses the configuration to locate the daemon socket.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod listener;
pub mod logging;

pub use config::FileConfig;
pub use lifecycle::{startup, Config, DaemonController, DaemonState, LifecycleError, StartupResult};
pub use listener::{ListenCtx, Listener};
