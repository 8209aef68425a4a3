use std::sync::Arc;

use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use types::{Message, Response};

use super::{read_message, write_frame};
use crate::errors::NodeError;

/// Anything that can turn an inbound [`Message`] into a [`Response`] — the
/// handler side of dispatch. Implemented by `NodeServices`; kept as a trait
/// so the listener has no compile-time dependency on routing state or the
/// local store, breaking the circular reference that would otherwise exist
/// between "the thing that forwards RPCs" and "the thing that serves them".
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, msg: Message) -> Response;
}

/// Runtime bounds on the listener that have no bearing on routing
/// correctness but keep a misbehaving or overeager peer from exhausting the
/// node: a cap on simultaneously open connections and a cap on the number
/// of bytes read before a frame must terminate.
#[derive(Debug, Clone, Copy)]
pub struct ListenerLimits {
    pub max_connections: usize,
    pub max_frame_bytes: u64,
}

impl Default for ListenerLimits {
    fn default() -> Self {
        Self {
            max_connections: 256,
            max_frame_bytes: 1 << 20,
        }
    }
}

/// Accepts connections on `listener` and hands each to a short-lived worker
/// task until `cancellation` fires, at which point the accept loop exits.
/// In-flight workers are not aborted; they run to completion or fail on
/// their own I/O. Connections beyond `limits.max_connections` wait on a
/// semaphore permit rather than being rejected outright.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<dyn Dispatcher>,
    cancellation: CancellationToken,
    limits: ListenerLimits,
) {
    let connections = Arc::new(Semaphore::new(limits.max_connections));
    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                tracing::info!("listener accept loop shutting down");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let dispatcher = dispatcher.clone();
                        let connections = connections.clone();
                        tokio::spawn(async move {
                            let Ok(permit) = connections.acquire_owned().await else {
                                return;
                            };
                            if let Err(err) =
                                handle_connection(stream, dispatcher, limits.max_frame_bytes).await
                            {
                                tracing::debug!(%peer, %err, "connection ended");
                            }
                            drop(permit);
                        });
                    }
                    Err(err) => {
                        tracing::warn!(%err, "accept failed");
                    }
                }
            }
        }
    }
}

/// Reads exactly one frame, dispatches it, writes exactly one frame back.
/// Protocol errors — unknown type, malformed JSON — are recoverable and
/// produce an error response frame instead of closing the connection
/// early; I/O failures propagate so the caller can log and move on.
async fn handle_connection(
    stream: TcpStream,
    dispatcher: Arc<dyn Dispatcher>,
    max_frame_bytes: u64,
) -> Result<(), NodeError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half.take(max_frame_bytes));

    match read_message(&mut reader).await {
        Ok(Some(msg)) => {
            let response = dispatcher.dispatch(msg).await;
            write_frame(&mut write_half, &response).await?;
        }
        Ok(None) => {
            // Peer closed before sending anything; nothing to respond to.
        }
        Err(err @ (NodeError::UnknownMessageType | NodeError::Protocol(_))) => {
            write_frame(&mut write_half, &Response::error(err.to_string())).await?;
        }
        Err(err) => return Err(err),
    }
    Ok(())
}
