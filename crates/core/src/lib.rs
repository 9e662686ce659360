// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sj-core: Core types for the script job service (sj)

pub mod macros;

pub mod clock;
pub mod hash;
pub mod id;
pub mod job;
pub mod path;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
#[cfg(any(test, feature = "test-support"))]
pub use hash::FailingHasher;
pub use hash::{job_id_for, ContentHasher, HashError, Sha256Hasher, JOB_ID_LEN};
pub use id::short;
pub use job::{JobId, JobOutcome, JobSpec};
pub use path::{ObjectPath, JOBS_ROOT, SERVICE_PATH};
