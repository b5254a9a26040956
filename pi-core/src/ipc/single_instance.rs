//! src/ipc/single_instance.rs
//! ============================================================================
//! # Single instance: one running pi per socket
//!
//! The first instance binds a Unix domain socket and forwards every path it
//! receives to the engine through an unbounded channel. Later invocations
//! probe the socket, hand their path to the running instance and exit.
//!
//! Wire format: one payload per connection, at most [`MAX_PAYLOAD`] bytes,
//! UTF-8. The payload `ping` is a liveness probe and is never forwarded.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;

pub const PING: &str = "ping";
pub const MAX_PAYLOAD: u64 = 4096;

/// Whether a live instance answers on `socket`.
///
/// A socket file that cannot be reached within `timeout` is stale and is
/// removed.
pub async fn probe(socket: &Path, timeout: Duration) -> bool {
    if !socket.exists() {
        return false;
    }

    let attempt = async {
        let mut stream: UnixStream = UnixStream::connect(socket).await?;
        stream.write_all(PING.as_bytes()).await?;
        stream.shutdown().await
    };

    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(())) => true,
        outcome => {
            let reason: String = match outcome {
                Ok(Err(e)) => e.to_string(),
                _ => "timed out".to_string(),
            };
            info!(
                marker = "INSTANCE_STALE_SOCKET",
                operation_type = "ipc",
                socket = %socket.display(),
                reason = %reason,
                "No live instance, removing socket"
            );
            let _ = std::fs::remove_file(socket);
            false
        }
    }
}

/// Hand `target` to the instance listening on `socket`.
pub async fn send(socket: &Path, target: &Path) -> Result<(), AppError> {
    let payload: String = target.to_string_lossy().into_owned();
    if payload.len() as u64 > MAX_PAYLOAD {
        return Err(AppError::ipc(format!(
            "path longer than {MAX_PAYLOAD} bytes"
        )));
    }

    let mut stream: UnixStream = UnixStream::connect(socket)
        .await
        .map_err(|e: io::Error| AppError::ipc(format!("connect {}: {e}", socket.display())))?;
    stream
        .write_all(payload.as_bytes())
        .await
        .map_err(|e: io::Error| AppError::ipc(format!("send: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e: io::Error| AppError::ipc(format!("send: {e}")))?;

    info!(
        marker = "INSTANCE_PATH_SENT",
        operation_type = "ipc",
        target = %payload,
        "Handed path to running instance"
    );
    Ok(())
}

/// Listener owned by the first instance. Dropping it stops accepting and
/// removes the socket file.
#[derive(Debug)]
pub struct InstanceServer {
    socket: PathBuf,
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl InstanceServer {
    /// Bind `socket`, replacing a stale file, and start accepting.
    ///
    /// Must be called inside a tokio runtime.
    pub fn bind(socket: PathBuf) -> Result<(Self, UnboundedReceiver<PathBuf>), AppError> {
        if socket.exists() {
            std::fs::remove_file(&socket)
                .map_err(|e: io::Error| AppError::ipc(format!("remove stale socket: {e}")))?;
        }
        let listener: UnixListener = UnixListener::bind(&socket)
            .map_err(|e: io::Error| AppError::ipc(format!("bind {}: {e}", socket.display())))?;

        let (tx, rx): (UnboundedSender<PathBuf>, UnboundedReceiver<PathBuf>) =
            mpsc::unbounded_channel();
        let cancel_token: CancellationToken = CancellationToken::new();
        let task: JoinHandle<()> = tokio::spawn(accept_loop(listener, tx, cancel_token.clone()));

        info!(
            marker = "INSTANCE_SERVER_STARTED",
            operation_type = "ipc",
            socket = %socket.display(),
            "Listening for paths from other invocations"
        );

        Ok((
            Self {
                socket,
                cancel_token,
                task: Some(task),
            },
            rx,
        ))
    }

    /// Stop accepting, wait for the listener task and remove the socket.
    pub async fn shutdown(mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        self.remove_socket();
    }

    fn remove_socket(&self) {
        match std::fs::remove_file(&self.socket) {
            Ok(()) => debug!(
                marker = "INSTANCE_SOCKET_REMOVED",
                operation_type = "ipc",
                socket = %self.socket.display(),
                "Socket removed"
            ),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                marker = "INSTANCE_SOCKET_REMOVE_FAILED",
                operation_type = "ipc",
                error = %e,
                "Failed to remove socket"
            ),
        }
    }
}

impl Drop for InstanceServer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if self.task.is_some() {
            self.remove_socket();
        }
    }
}

async fn accept_loop(
    listener: UnixListener,
    tx: UnboundedSender<PathBuf>,
    cancel_token: CancellationToken,
) {
    loop {
        let stream: UnixStream = tokio::select! {
            () = cancel_token.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(
                        marker = "INSTANCE_ACCEPT_FAILED",
                        operation_type = "ipc",
                        error = %e,
                        "Accept failed, listener stopped"
                    );
                    break;
                }
            },
        };

        match read_payload(stream).await {
            Ok(payload) if payload.is_empty() || payload == PING => {}
            Ok(payload) => {
                debug!(
                    marker = "INSTANCE_PATH_RECEIVED",
                    operation_type = "ipc",
                    target = %payload,
                    "Path received"
                );
                if tx.send(PathBuf::from(payload)).is_err() {
                    break;
                }
            }
            Err(e) => debug!(
                marker = "INSTANCE_READ_FAILED",
                operation_type = "ipc",
                error = %e,
                "Dropping unreadable connection"
            ),
        }
    }
}

async fn read_payload(stream: UnixStream) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    stream.take(MAX_PAYLOAD).read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).trim_end_matches(['\n', '\0']).to_string())
}
