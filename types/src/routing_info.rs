use crate::address::NodeAddress;
use crate::id::Id;
use serde::{Deserialize, Serialize};

/// A snapshot of one node's routing state, suitable for gossiping to a peer
/// over `ROUTING_INFO` or as the payload of a successful `JOIN` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub node_id: Id,
    pub leaf_set_smaller: Vec<NodeAddress>,
    pub leaf_set_larger: Vec<NodeAddress>,
    pub routing_table: Vec<Vec<Option<NodeAddress>>>,
}

impl RoutingInfo {
    /// Every peer named anywhere in this snapshot — both leaf sets and every
    /// occupied routing-table cell — used by `RoutingState::merge`.
    pub fn peers(&self) -> impl Iterator<Item = &NodeAddress> {
        self.leaf_set_smaller
            .iter()
            .chain(self.leaf_set_larger.iter())
            .chain(self.routing_table.iter().flatten().filter_map(Option::as_ref))
    }
}
