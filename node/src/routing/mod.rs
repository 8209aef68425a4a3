//! Leaf set + prefix routing table: the two structures a Pastry node
//! consults to decide whether it is root for a key and, if not, who to ask
//! next.

use std::sync::RwLock;

use types::{Config, Id, IdSpace, NodeAddress, RoutingInfo};

#[derive(Debug)]
struct Inner {
    leaf_smaller: Vec<NodeAddress>,
    leaf_larger: Vec<NodeAddress>,
    table: Vec<Vec<Option<NodeAddress>>>,
}

/// Owns the leaf set and routing table for one local identity and answers
/// the routing questions the rest of the node asks of it.
///
/// Every public method takes the lock, computes its answer or mutation, and
/// releases it before returning; `next_hop`/`snapshot` return owned clones
/// rather than guards so a caller never holds the lock across an outbound
/// RPC.
#[derive(Debug)]
pub struct RoutingState {
    config: Config,
    idspace: IdSpace,
    local: NodeAddress,
    inner: RwLock<Inner>,
}

impl RoutingState {
    pub fn new(config: Config, local: NodeAddress) -> Self {
        let table = vec![vec![None; config.cols()]; config.rows];
        Self {
            config,
            idspace: IdSpace::new(config),
            local,
            inner: RwLock::new(Inner {
                leaf_smaller: Vec::new(),
                leaf_larger: Vec::new(),
                table,
            }),
        }
    }

    pub fn local(&self) -> &NodeAddress {
        &self.local
    }

    pub fn local_id(&self) -> Id {
        self.local.node_id
    }

    /// Idempotent merge of one peer into leaf set and routing table.
    #[tracing::instrument(skip(self))]
    pub fn insert(&self, peer: NodeAddress) {
        if peer.node_id == self.local.node_id {
            return;
        }
        let leaf_set_size = self.config.leaf_set_size;
        let mut inner = self.inner.write().unwrap();

        if peer.node_id < self.local.node_id {
            inner.leaf_smaller.retain(|a| a.node_id != peer.node_id);
            inner.leaf_smaller.push(peer.clone());
            inner.leaf_smaller.sort_by(|a, b| b.node_id.cmp(&a.node_id));
            inner.leaf_smaller.truncate(leaf_set_size);
        } else {
            inner.leaf_larger.retain(|a| a.node_id != peer.node_id);
            inner.leaf_larger.push(peer.clone());
            inner.leaf_larger.sort_by(|a, b| a.node_id.cmp(&b.node_id));
            inner.leaf_larger.truncate(leaf_set_size);
        }

        let i = self.idspace.shared_prefix_len(self.local.node_id, peer.node_id);
        if (i as usize) < self.config.rows {
            let d = self.idspace.digit(peer.node_id, i) as usize;
            if inner.table[i as usize][d].is_none() {
                inner.table[i as usize][d] = Some(peer);
            }
        }
    }

    /// True iff the local id is the closest live id to `key`.
    #[tracing::instrument(skip(self))]
    pub fn is_root(&self, key: Id) -> bool {
        let inner = self.inner.read().unwrap();
        if inner.leaf_smaller.is_empty() && inner.leaf_larger.is_empty() {
            return true;
        }
        let pred = inner
            .leaf_smaller
            .first()
            .map(|a| a.node_id)
            .unwrap_or(self.local.node_id);
        let succ = inner
            .leaf_larger
            .first()
            .map(|a| a.node_id)
            .unwrap_or(self.local.node_id);

        let d_local = self.idspace.ring_distance(self.local.node_id, key);
        let d_pred = self.idspace.ring_distance(pred, key);
        let d_succ = self.idspace.ring_distance(succ, key);
        d_local <= d_pred && d_local <= d_succ
    }

    /// Next peer to forward `key` towards, assuming `is_root(key)` is false.
    /// Leaf-set routing, then prefix routing, then a rare-case linear scan,
    /// in that order; `None` means "serve it locally".
    #[tracing::instrument(skip(self))]
    pub fn next_hop(&self, key: Id) -> Option<NodeAddress> {
        let inner = self.inner.read().unwrap();

        if let Some(hop) = self.leaf_set_hop(&inner, key) {
            return Some(hop);
        }

        let i = self.idspace.shared_prefix_len(self.local.node_id, key);
        let d = self.idspace.digit(key, i) as usize;
        if (i as usize) < self.config.rows {
            if let Some(candidate) = &inner.table[i as usize][d] {
                if self.idspace.shared_prefix_len(candidate.node_id, key) > i {
                    return Some(candidate.clone());
                }
            }
        }

        self.fallback_scan(&inner, key, i)
    }

    fn leaf_set_hop(&self, inner: &Inner, key: Id) -> Option<NodeAddress> {
        let lo = inner
            .leaf_smaller
            .last()
            .map(|a| a.node_id)
            .unwrap_or(self.local.node_id);
        let hi = inner
            .leaf_larger
            .last()
            .map(|a| a.node_id)
            .unwrap_or(self.local.node_id);
        if inner.leaf_smaller.is_empty() && inner.leaf_larger.is_empty() {
            return None;
        }
        if key.0 < lo.0 || key.0 > hi.0 {
            return None;
        }
        inner
            .leaf_smaller
            .iter()
            .chain(inner.leaf_larger.iter())
            .min_by(|a, b| {
                let da = a.node_id.0.abs_diff(key.0);
                let db = b.node_id.0.abs_diff(key.0);
                da.cmp(&db).then(a.node_id.cmp(&b.node_id))
            })
            .cloned()
    }

    fn fallback_scan(&self, inner: &Inner, key: Id, i: u32) -> Option<NodeAddress> {
        let local_distance = self.local.node_id.0.abs_diff(key.0);
        inner
            .leaf_smaller
            .iter()
            .chain(inner.leaf_larger.iter())
            .chain(inner.table.iter().flatten().filter_map(Option::as_ref))
            .filter(|p| {
                self.idspace.shared_prefix_len(p.node_id, key) >= i
                    && p.node_id.0.abs_diff(key.0) < local_distance
            })
            .min_by_key(|p| p.node_id.0.abs_diff(key.0))
            .cloned()
    }

    /// Folds every peer named in `info` into this node's routing state.
    pub fn merge(&self, info: RoutingInfo) {
        let peers: Vec<NodeAddress> = info.peers().cloned().collect();
        for peer in peers {
            self.insert(peer);
        }
    }

    /// A gossip-ready description of the current leaf set and routing table.
    pub fn snapshot(&self) -> RoutingInfo {
        let inner = self.inner.read().unwrap();
        RoutingInfo {
            node_id: self.local.node_id,
            leaf_set_smaller: inner.leaf_smaller.clone(),
            leaf_set_larger: inner.leaf_larger.clone(),
            routing_table: inner.table.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(id: u64) -> NodeAddress {
        NodeAddress::new(Id(id), "127.0.0.1", 5000 + id as u16)
    }

    fn state() -> RoutingState {
        RoutingState::new(Config::default(), addr(0x8000))
    }

    #[test]
    fn insert_ignores_the_local_id() {
        let state = state();
        state.insert(addr(0x8000));
        let snap = state.snapshot();
        assert!(snap.leaf_set_smaller.is_empty());
        assert!(snap.leaf_set_larger.is_empty());
    }

    #[test]
    fn insert_is_idempotent() {
        let state = state();
        state.insert(addr(0x7000));
        state.insert(addr(0x7000));
        let snap = state.snapshot();
        assert_eq!(snap.leaf_set_smaller.len(), 1);
    }

    #[test]
    fn leaf_sets_stay_sorted_and_bounded() {
        let state = state();
        for id in [0x100, 0x200, 0x300, 0x400, 0x500] {
            state.insert(addr(id));
        }
        let snap = state.snapshot();
        assert_eq!(snap.leaf_set_smaller.len(), 4);
        let ids: Vec<u64> = snap.leaf_set_smaller.iter().map(|a| a.node_id.0).collect();
        assert_eq!(ids, vec![0x500, 0x400, 0x300, 0x200]);
    }

    #[test]
    fn leaf_sets_keep_the_closest_entries_on_truncation() {
        let state = state();
        for id in [0x7000, 0x100, 0x7500, 0x7900] {
            state.insert(addr(id));
        }
        let snap = state.snapshot();
        // L=4 so nothing truncated yet; add a fifth, further peer.
        assert_eq!(snap.leaf_set_smaller.len(), 4);
        state.insert(addr(0x50));
        let snap = state.snapshot();
        assert_eq!(snap.leaf_set_smaller.len(), 4);
        assert!(!snap
            .leaf_set_smaller
            .iter()
            .any(|a| a.node_id == Id(0x50)));
    }

    #[test]
    fn routing_table_cell_respects_prefix_discipline() {
        let state = state();
        // local = 0x8000, peer shares 0 digits, its digit 0 is 0x7.
        state.insert(addr(0x7123));
        let snap = state.snapshot();
        let cell = snap.routing_table[0][0x7].as_ref().expect("cell filled");
        assert_eq!(cell.node_id, Id(0x7123));
    }

    #[test]
    fn occupied_routing_cell_is_stable() {
        let state = state();
        state.insert(addr(0x7123));
        state.insert(addr(0x7456));
        let snap = state.snapshot();
        assert_eq!(snap.routing_table[0][0x7].as_ref().unwrap().node_id, Id(0x7123));
    }

    #[test]
    fn singleton_ring_is_root_of_everything() {
        let state = state();
        assert!(state.is_root(Id(0)));
        assert!(state.is_root(Id(0xFFFF)));
    }

    #[test]
    fn is_root_false_once_a_closer_peer_exists() {
        let state = state();
        state.insert(addr(0x8010));
        assert!(!state.is_root(Id(0x8010)));
        assert!(state.is_root(Id(0x8000)));
    }

    #[test]
    fn next_hop_prefers_leaf_set_when_key_is_in_range() {
        let state = state();
        state.insert(addr(0x7000));
        state.insert(addr(0x9000));
        let hop = state.next_hop(Id(0x7500)).expect("expected a hop");
        assert_eq!(hop.node_id, Id(0x7000));
    }

    #[test]
    fn next_hop_returns_none_when_node_is_effectively_root() {
        let state = state();
        assert_eq!(state.next_hop(Id(0x1234)), None);
    }
}
