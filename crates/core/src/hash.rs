// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content hashing and job ID derivation.
//!
//! Job IDs are content-addressed: the script body salted with the submission
//! time (whole Unix seconds) is hashed and the hex digest truncated to
//! [`JOB_ID_LEN`] characters.

use std::fmt::Write;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::clock::Clock;
use crate::job::JobId;

/// Length of a job ID in hex characters.
pub const JOB_ID_LEN: usize = 16;

/// Errors from content hashing
#[derive(Debug, Error)]
pub enum HashError {
    #[error("hash computation failed: {0}")]
    Failed(String),
}

/// Deterministic content-addressing primitive.
pub trait ContentHasher: Send + Sync + 'static {
    /// Hash `content` into a lowercase hex string.
    fn hash(&self, content: &[u8]) -> Result<String, HashError>;
}

/// SHA-256 hasher
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hash(&self, content: &[u8]) -> Result<String, HashError> {
        let digest = Sha256::digest(content);
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            write!(hex, "{byte:02x}").map_err(|e| HashError::Failed(e.to_string()))?;
        }
        Ok(hex)
    }
}

/// Derive the ID for a script submitted at the clock's current time.
pub fn job_id_for(
    hasher: &dyn ContentHasher,
    clock: &impl Clock,
    script: &str,
) -> Result<JobId, HashError> {
    let salted = format!("{}_{}", clock.epoch_secs(), script);
    let digest = hasher.hash(salted.as_bytes())?;
    Ok(JobId::new(crate::id::short(&digest, JOB_ID_LEN)))
}

/// Hasher that always fails, for exercising admission failures.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingHasher;

#[cfg(any(test, feature = "test-support"))]
impl ContentHasher for FailingHasher {
    fn hash(&self, _content: &[u8]) -> Result<String, HashError> {
        Err(HashError::Failed("digest context unavailable".to_string()))
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
