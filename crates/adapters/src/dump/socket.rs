// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collector reached over a Unix socket speaking the sj wire framing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sj_core::ObjectPath;
use sj_wire::{read_frame, write_frame, CollectorRequest, CollectorResponse, ProtocolError};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{DumpAdapter, DumpError, ProgressSubscription, ProgressUpdate};

/// Buffered notifications per subscription before the reader waits.
const SUBSCRIPTION_BUFFER: usize = 16;

/// Production collector adapter.
#[derive(Clone, Debug)]
pub struct SocketDumpAdapter {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketDumpAdapter {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { socket_path: socket_path.into(), timeout }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn connect(&self) -> Result<UnixStream, DumpError> {
        match tokio::time::timeout(self.timeout, UnixStream::connect(&self.socket_path)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(DumpError::Unavailable(format!(
                "{}: {}",
                self.socket_path.display(),
                e
            ))),
            Err(_) => Err(DumpError::Unavailable(format!(
                "{}: connect timed out",
                self.socket_path.display()
            ))),
        }
    }
}

#[async_trait]
impl DumpAdapter for SocketDumpAdapter {
    async fn create_dump(&self) -> Result<ObjectPath, DumpError> {
        let mut stream = self.connect().await?;
        let exchange = async {
            write_frame(&mut stream, &CollectorRequest::CreateDump).await?;
            read_frame::<CollectorResponse, _>(&mut stream).await
        };
        let reply = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        match reply {
            CollectorResponse::DumpCreated { path } => Ok(path),
            CollectorResponse::Error { message } => Err(DumpError::Rejected(message)),
            other => Err(DumpError::UnexpectedReply(format!("{other:?}"))),
        }
    }

    async fn subscribe(&self, path: &ObjectPath) -> Result<ProgressSubscription, DumpError> {
        let mut stream = self.connect().await?;
        tokio::time::timeout(
            self.timeout,
            write_frame(&mut stream, &CollectorRequest::WatchProgress { path: path.clone() }),
        )
        .await
        .map_err(|_| ProtocolError::Timeout)??;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let stop = CancellationToken::new();
        let guard = stop.clone().drop_guard();
        let watched = path.clone();

        tokio::spawn(async move {
            loop {
                let frame = tokio::select! {
                    _ = stop.cancelled() => break,
                    frame = read_frame::<CollectorResponse, _>(&mut stream) => frame,
                };
                match frame {
                    Ok(CollectorResponse::PropertiesChanged { path, interface, changed }) => {
                        if path != watched {
                            continue;
                        }
                        if tx.send(ProgressUpdate { interface, changed }).await.is_err() {
                            break;
                        }
                    }
                    Ok(CollectorResponse::Error { message }) => {
                        warn!(path = %watched, %message, "collector ended progress watch");
                        break;
                    }
                    Ok(other) => debug!(path = %watched, reply = ?other, "ignoring collector frame"),
                    Err(ProtocolError::ConnectionClosed) => {
                        debug!(path = %watched, "collector closed progress watch");
                        break;
                    }
                    Err(e) => {
                        warn!(path = %watched, error = %e, "progress watch failed");
                        break;
                    }
                }
            }
        });

        Ok(ProgressSubscription::new(rx, Some(guard)))
    }
}
