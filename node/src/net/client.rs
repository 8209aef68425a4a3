use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::time::timeout;
use types::{Message, NodeAddress, Response};

use super::{read_frame, write_frame};

/// Outbound RPC timeouts.
#[derive(Debug, Clone, Copy)]
pub struct RpcTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for RpcTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            read: Duration::from_secs(5),
        }
    }
}

/// Opens a connection to `addr`, writes one frame, reads one frame, and
/// closes. Every failure mode — connect, write, read, deserialize, timeout
/// — is folded into a synthetic `{status:"error", ...}` response rather
/// than propagated, so a caller forwarding a request never has to handle a
/// transport exception on top of the routing logic.
#[tracing::instrument(skip(msg))]
pub async fn send(addr: &NodeAddress, msg: &Message, timeouts: RpcTimeouts) -> Response {
    match send_inner(addr, msg, timeouts).await {
        Ok(resp) => resp,
        Err(err) => Response::error(err.to_string()),
    }
}

async fn send_inner(
    addr: &NodeAddress,
    msg: &Message,
    timeouts: RpcTimeouts,
) -> Result<Response, crate::errors::NodeError> {
    let stream = timeout(timeouts.connect, TcpStream::connect(addr.socket_addr()))
        .await
        .map_err(|_| crate::errors::NodeError::Timeout(timeouts.connect))?
        .map_err(|source| crate::errors::NodeError::Connect {
            addr: addr.socket_addr(),
            source,
        })?;

    let (read_half, mut write_half) = stream.into_split();
    write_frame(&mut write_half, msg).await?;

    let mut reader = BufReader::new(read_half);
    let response = timeout(timeouts.read, read_frame::<_, Response>(&mut reader))
        .await
        .map_err(|_| crate::errors::NodeError::Timeout(timeouts.read))??;

    response.ok_or(crate::errors::NodeError::ConnectionClosed)
}
