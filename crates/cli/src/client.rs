// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client: one request per connection over the daemon socket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sj_daemon::LifecycleError;
use sj_wire::{read_frame, write_frame, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {})", .0.display())]
    DaemonNotRunning(PathBuf),

    #[error("could not locate daemon: {0}")]
    Config(#[from] LifecycleError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response: {0:?}")]
    Unexpected(Box<Response>),
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Locate the user daemon from the environment and `config.toml`.
    pub fn connect() -> Result<Self, ClientError> {
        let config = sj_daemon::Config::load()?;
        Self::for_socket(config.socket_path, sj_daemon::env::ipc_timeout())
    }

    pub fn for_socket(socket_path: impl Into<PathBuf>, timeout: Duration) -> Result<Self, ClientError> {
        let socket_path = socket_path.into();
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path));
        }
        Ok(Self { socket_path, timeout })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send one request and wait for its response.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
                ) =>
            {
                return Err(ClientError::DaemonNotRunning(self.socket_path.clone()))
            }
            Err(e) => return Err(ProtocolError::Io(e).into()),
        };

        let exchange = async {
            write_frame(&mut stream, request).await?;
            read_frame::<Response, _>(&mut stream).await
        };
        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProtocolError::Timeout)??;
        Ok(response)
    }

    /// Map a response the caller did not expect to an error.
    pub(crate) fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Err(ClientError::Unexpected(Box::new(other))),
        }
    }
}

#[path = "client_queries.rs"]
mod queries;

pub use queries::DaemonStatus;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
