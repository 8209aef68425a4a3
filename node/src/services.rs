use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use types::{Config, Id, IdSpace, Message, NodeAddress, Response};

use crate::errors::NodeError;
use crate::net::client::{self, RpcTimeouts};
use crate::net::listener::Dispatcher;
use crate::routing::RoutingState;

/// The four top-level handlers, bound to one local identity: hashes keys,
/// asks `RoutingState` whether it is root, and either serves the local store
/// or forwards one hop closer via `net::client::send`. This is the only
/// place routing decisions, the key-value map, and outbound RPC meet —
/// everything below it is pure, everything above it is wire framing.
#[derive(Debug)]
pub struct NodeServices {
    idspace: IdSpace,
    local: NodeAddress,
    routing: Arc<RoutingState>,
    store: RwLock<HashMap<Id, serde_json::Value>>,
    rpc_timeouts: RpcTimeouts,
}

impl NodeServices {
    pub fn new(config: Config, local: NodeAddress, rpc_timeouts: RpcTimeouts) -> Self {
        Self {
            idspace: IdSpace::new(config),
            routing: Arc::new(RoutingState::new(config, local.clone())),
            local,
            store: RwLock::new(HashMap::new()),
            rpc_timeouts,
        }
    }

    pub fn routing(&self) -> &Arc<RoutingState> {
        &self.routing
    }

    /// Announces this node to `bootstrap` and merges back whatever routing
    /// state it offers. Best-effort: a failed join leaves the node running
    /// as a singleton ring rather than aborting startup.
    #[tracing::instrument(skip(self))]
    pub async fn join(&self, bootstrap: &NodeAddress) -> Response {
        let msg = Message::Join {
            node_id: self.local.node_id.0,
            ip: self.local.host.clone(),
            port: self.local.port,
        };
        let response = client::send(bootstrap, &msg, self.rpc_timeouts).await;
        if response.is_success() {
            if let Some(info) = response.routing_info.clone() {
                // `info.node_id` is the bootstrap's own id; it is not among
                // the peers its snapshot carries (a node never lists itself
                // in its own leaf set/table), so it needs inserting by hand
                // or this node would merge bootstrap's neighbors without
                // ever learning about bootstrap itself.
                self.routing.insert(NodeAddress::new(
                    info.node_id,
                    bootstrap.host.clone(),
                    bootstrap.port,
                ));
                self.routing.merge(info);
            }
        } else {
            tracing::warn!(
                bootstrap = %bootstrap.socket_addr(),
                "join failed, continuing in singleton mode"
            );
        }
        response
    }

    fn handle_join(&self, node_id: u64, ip: String, port: u16) -> Response {
        let sender = NodeAddress::new(Id(node_id), ip, port);
        self.routing.insert(sender);
        Response::success_routing_info(self.routing.snapshot())
    }

    /// Writes `key`/`value` at whichever node is currently root for `key`.
    /// A store never hard-fails: if routing finds no next hop and this node
    /// isn't root either, it stores locally anyway as a last-resort
    /// fallback and says so in the response message.
    #[tracing::instrument(skip(self, value))]
    pub async fn store(&self, key: String, value: serde_json::Value) -> Response {
        let id = self.idspace.hash(key.as_bytes());
        if self.routing.is_root(id) {
            self.store.write().unwrap().insert(id, value);
            return Response::success();
        }
        match self.routing.next_hop(id) {
            Some(hop) => {
                let msg = Message::Store { key, value };
                client::send(&hop, &msg, self.rpc_timeouts).await
            }
            None => {
                self.store.write().unwrap().insert(id, value);
                Response::success_with_message("stored locally as fallback; no route found")
            }
        }
    }

    /// Returns `value` for `key` if it is found anywhere along the route to
    /// its root; a miss at the root reports "not found".
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, key: String) -> Response {
        let id = self.idspace.hash(key.as_bytes());
        if let Some(value) = self.store.read().unwrap().get(&id).cloned() {
            return Response::success_value(value);
        }
        if self.routing.is_root(id) {
            return NodeError::KeyNotFound.into_response();
        }
        match self.routing.next_hop(id) {
            Some(hop) => {
                let msg = Message::Lookup { key };
                client::send(&hop, &msg, self.rpc_timeouts).await
            }
            // No next hop treats us as effectively root, so a miss here is
            // the same "not found" a true root would report.
            None => NodeError::KeyNotFound.into_response(),
        }
    }

    fn handle_routing_info(&self, info: types::RoutingInfo) -> Response {
        self.routing.merge(info);
        Response::success()
    }
}

#[async_trait::async_trait]
impl Dispatcher for NodeServices {
    async fn dispatch(&self, msg: Message) -> Response {
        match msg {
            Message::Join { node_id, ip, port } => self.handle_join(node_id, ip, port),
            Message::Store { key, value } => self.store(key, value).await,
            Message::Lookup { key } => self.lookup(key).await,
            Message::RoutingInfo { routing_info } => self.handle_routing_info(routing_info),
        }
    }
}
