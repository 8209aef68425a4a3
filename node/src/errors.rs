use thiserror::Error;
use types::Response;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out after {0:?} talking to peer")]
    Timeout(std::time::Duration),
    #[error("i/o error talking to peer: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("Unknown message type")]
    UnknownMessageType,
    #[error("connection closed before a frame was received")]
    ConnectionClosed,
    #[error("Key not found")]
    KeyNotFound,
    #[error("no route to key and node is not root")]
    RoutingExhausted,
}

impl NodeError {
    pub fn into_response(self) -> Response {
        Response::error(self.to_string())
    }
}

impl From<NodeError> for Response {
    fn from(err: NodeError) -> Self {
        err.into_response()
    }
}
