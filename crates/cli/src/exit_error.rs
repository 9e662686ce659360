// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error carrying a process exit code.
//!
//! Commands whose request was delivered but refused (a job not admitted, an
//! unknown job ID) return this so `main()` can exit non-zero without the
//! generic error prefix.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: u8,
    pub message: String,
}

impl ExitError {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Exit status 1 with `message`.
    pub fn refused(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}
