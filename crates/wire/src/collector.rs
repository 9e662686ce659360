// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages exchanged with the diagnostic collection service.
//!
//! `CreateDump` is a single request/response exchange. `WatchProgress` turns
//! the connection into a notification stream: the collector writes one
//! `PropertiesChanged` frame per change until either side closes it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sj_core::ObjectPath;

/// Request from the daemon to the collector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CollectorRequest {
    /// Create a new diagnostic bundle
    CreateDump,

    /// Subscribe to progress property changes of a bundle
    WatchProgress { path: ObjectPath },
}

/// Message from the collector to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CollectorResponse {
    /// Bundle created; `path` ends with the bundle ID
    DumpCreated { path: ObjectPath },

    /// Progress properties of a watched bundle changed
    PropertiesChanged {
        path: ObjectPath,
        interface: String,
        changed: BTreeMap<String, String>,
    },

    /// Error response
    Error { message: String },
}
