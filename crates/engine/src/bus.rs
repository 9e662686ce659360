// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of published bus objects.
//!
//! Remote callers address objects by [`ObjectPath`] and invoke named
//! methods on them. Methods take no arguments and answer with a boolean,
//! which covers every operation a published object exposes.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sj_core::ObjectPath;
use thiserror::Error;

/// Errors from bus dispatch
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("no object published at {0}")]
    UnknownObject(ObjectPath),

    #[error("interface {interface} has no method {method}")]
    UnknownMethod { interface: &'static str, method: String },

    #[error("an object is already published at {0}")]
    PathInUse(ObjectPath),
}

/// An object reachable over the bus.
pub trait BusObject: Send + Sync + 'static {
    /// Interface name reported to callers.
    fn interface(&self) -> &'static str;

    /// Invoke `method`.
    fn call(&self, method: &str) -> Result<bool, BusError>;
}

/// Path → object table shared by the controller and the listener.
#[derive(Clone, Default)]
pub struct ObjectServer {
    objects: Arc<Mutex<BTreeMap<ObjectPath, Arc<dyn BusObject>>>>,
}

impl ObjectServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `object` at `path`. Fails if the path is taken.
    pub fn publish(&self, path: ObjectPath, object: Arc<dyn BusObject>) -> Result<(), BusError> {
        let mut objects = self.objects.lock();
        if objects.contains_key(&path) {
            return Err(BusError::PathInUse(path));
        }
        tracing::debug!(%path, interface = object.interface(), "published bus object");
        objects.insert(path, object);
        Ok(())
    }

    /// Remove the object at `path`; returns whether one was there.
    pub fn unpublish(&self, path: &ObjectPath) -> bool {
        let removed = self.objects.lock().remove(path).is_some();
        if removed {
            tracing::debug!(%path, "unpublished bus object");
        }
        removed
    }

    pub fn is_published(&self, path: &ObjectPath) -> bool {
        self.objects.lock().contains_key(path)
    }

    /// Published paths in sorted order.
    pub fn paths(&self) -> Vec<ObjectPath> {
        self.objects.lock().keys().cloned().collect()
    }

    /// Dispatch `method` to the object at `path`.
    ///
    /// The table lock is released before the method runs, so methods may
    /// publish or unpublish objects themselves.
    pub fn call(&self, path: &ObjectPath, method: &str) -> Result<bool, BusError> {
        let object = self
            .objects
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| BusError::UnknownObject(path.clone()))?;
        object.call(method)
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
