use crate::id::Id;
use serde::{Deserialize, Serialize};

/// A peer's position on the ring plus the transport coordinates currently
/// believed to reach it.
///
/// Two `NodeAddress` values are equal iff their `node_id` matches: the
/// host/port are cached locating information and may be refreshed without
/// changing identity, which is why equality and hashing are implemented by
/// hand instead of derived.
///
/// On the wire a `NodeAddress` is a plain 3-element JSON array
/// `[node_id, host, port]`; the conversion happens once at the boundary via
/// [`NodeAddressWire`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "NodeAddressWire", from = "NodeAddressWire")]
pub struct NodeAddress {
    pub node_id: Id,
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(node_id: Id, host: impl Into<String>, port: u16) -> Self {
        Self {
            node_id,
            host: host.into(),
            port,
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PartialEq for NodeAddress {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl Eq for NodeAddress {}

impl PartialOrd for NodeAddress {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeAddress {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.node_id.cmp(&other.node_id)
    }
}

impl std::hash::Hash for NodeAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node_id.hash(state)
    }
}

type NodeAddressWire = (u64, String, u16);

impl From<NodeAddress> for NodeAddressWire {
    fn from(addr: NodeAddress) -> Self {
        (addr.node_id.0, addr.host, addr.port)
    }
}

impl From<NodeAddressWire> for NodeAddress {
    fn from((node_id, host, port): NodeAddressWire) -> Self {
        Self {
            node_id: Id(node_id),
            host,
            port,
        }
    }
}
