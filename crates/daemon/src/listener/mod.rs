// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and serving
//! one request per connection against the job controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sj_adapters::DumpAdapter;
use sj_wire::{self as protocol, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::env::PROTOCOL_VERSION;
use crate::lifecycle::DaemonController;

/// Shared daemon context for all request handlers.
pub struct ListenCtx<D: DumpAdapter> {
    pub controller: DaemonController<D>,
    pub start_time: Instant,
    /// Notified when a client requests shutdown
    pub shutdown: Arc<Notify>,
    /// Per-frame read/write timeout
    pub ipc_timeout: Duration,
}

/// Listener task for accepting socket connections.
pub struct Listener<D: DumpAdapter> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<D>>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl<D: DumpAdapter> Listener<D> {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx<D>>) -> Self {
        Self { unix, ctx }
    }

    /// Run the listener loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("Unix accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected")
        }
        ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
            warn!("Connection timeout")
        }
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection.
///
/// The request handler is raced against client disconnect detection; if the
/// client goes away first, no response is written.
pub(crate) async fn handle_connection<R, W, D>(
    mut reader: R,
    mut writer: W,
    ctx: &ListenCtx<D>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    D: DumpAdapter,
{
    let request = protocol::read_request(&mut reader, ctx.ipc_timeout).await?;

    // Polling requests at debug level, the rest at info
    if matches!(request, Request::Ping | Request::Status | Request::ListActive | Request::Objects) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = tokio::select! {
        response = handle_request(request, ctx) => response,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("Client disconnected, dropping handler");
            return Ok(());
        }
    };

    debug!("Sending response: {:?}", response);
    protocol::write_response(&mut writer, &response, ctx.ipc_timeout).await?;
    Ok(())
}

/// Resolves once the client closes its end (or sends unexpected bytes).
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

async fn handle_request<D: DumpAdapter>(request: Request, ctx: &ListenCtx<D>) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::ListActive => Response::Active { ids: ctx.controller.list_active() },

        Request::Start { script, timeout_secs, dump_needed } => {
            // Runs detached so a vanished client cannot abandon a half-started job
            let controller = ctx.controller.clone();
            let start = tokio::spawn(async move {
                controller.start(script, timeout_secs, dump_needed).await
            });
            match start.await {
                Ok(ok) => Response::Started { ok },
                Err(e) => {
                    error!(error = %e, "start task failed");
                    Response::Started { ok: false }
                }
            }
        }

        Request::Cancel { id } => Response::Cancelled { ok: ctx.controller.cancel(&id) },

        Request::Call { path, method } => match ctx.controller.bus().call(&path, &method) {
            Ok(ok) => Response::Reply { ok },
            Err(e) => Response::Error { message: e.to_string() },
        },

        Request::Objects => Response::Objects { paths: ctx.controller.bus().paths() },

        Request::Status => Response::Status {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            active: ctx.controller.list_active().len(),
            max_active: ctx.controller.max_active(),
            pending_dumps: ctx.controller.runner().dumps().pending(),
        },

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
