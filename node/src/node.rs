use std::io::Result as IoResult;
use std::net::SocketAddr;
use std::sync::Arc;

use task_manager::TaskManager;
use tokio::net::TcpListener;
use types::{Config, Id, IdSpace, NodeAddress, Response};

use crate::net::client::RpcTimeouts;
use crate::net::listener::{self, Dispatcher, ListenerLimits};
use crate::services::NodeServices;

/// The node lifecycle: bind, optionally join, serve, and eventually shut
/// down. Ties together `NodeServices` (handlers), the listener accept loop,
/// and a `TaskManager` for graceful shutdown.
pub struct Node {
    services: Arc<NodeServices>,
    task_manager: TaskManager,
    local_addr: SocketAddr,
}

impl Node {
    /// Binds a listener on `host:port`, starts accepting, and — if
    /// `bootstrap` is given — performs `join` against it before returning.
    /// Uses `types::Config::default()` identifier geometry and default RPC
    /// timeouts/listener limits; see [`Node::with_config`] to override them.
    pub async fn new(
        host: impl Into<String>,
        port: u16,
        bootstrap: Option<NodeAddress>,
    ) -> IoResult<Self> {
        Self::with_config(
            host,
            port,
            bootstrap,
            Config::default(),
            RpcTimeouts::default(),
            ListenerLimits::default(),
        )
        .await
    }

    pub async fn with_config(
        host: impl Into<String>,
        port: u16,
        bootstrap: Option<NodeAddress>,
        config: Config,
        rpc_timeouts: RpcTimeouts,
        limits: ListenerLimits,
    ) -> IoResult<Self> {
        let host = host.into();
        let listener = TcpListener::bind((host.as_str(), port)).await?;
        let local_addr = listener.local_addr()?;

        let idspace = IdSpace::new(config);
        let local_id = idspace.hash(format!("{host}:{}", local_addr.port()).as_bytes());
        let local = NodeAddress::new(local_id, host, local_addr.port());

        tracing::info!(node_id = %local.node_id, addr = %local_addr, "node identity derived");

        let services = Arc::new(NodeServices::new(config, local, rpc_timeouts));
        let task_manager = TaskManager::new();

        let dispatcher: Arc<dyn Dispatcher> = services.clone();
        let cancellation = task_manager.cancellation_token();
        task_manager
            .spawn_task_loop(
                move |guard| async move {
                    tokio::select! {
                        _ = listener::serve(listener, dispatcher, cancellation, limits) => {}
                        _ = guard.is_cancelled() => {}
                    }
                },
                "pastry-listener".to_string(),
            )
            .await;

        let node = Self {
            services,
            task_manager,
            local_addr,
        };

        if let Some(bootstrap) = bootstrap {
            node.services.join(&bootstrap).await;
        }

        Ok(node)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn node_id(&self) -> Id {
        self.services.routing().local_id()
    }

    /// Hashes `key`, routes to its current root (possibly this node), and
    /// writes `value` there.
    pub async fn store(&self, key: impl Into<String>, value: serde_json::Value) -> Response {
        self.services.store(key.into(), value).await
    }

    /// Hashes `key` and either returns the value or a clean not-found
    /// response.
    pub async fn lookup(&self, key: impl Into<String>) -> Response {
        self.services.lookup(key.into()).await
    }

    /// Idempotent. Stops the listener accept loop; does not hard-abort
    /// in-flight connection workers.
    pub fn shutdown(&self) {
        self.task_manager.cancel_all();
    }

    /// Waits for the listener task (and any other tracked tasks) to finish
    /// unwinding after [`Node::shutdown`].
    pub async fn wait_for_shutdown(&self) {
        self.task_manager.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn singleton_store_then_lookup() {
        let node = Node::new("127.0.0.1", 0, None).await.unwrap();
        let resp = node.store("apple", serde_json::json!("red")).await;
        assert!(resp.is_success());
        let resp = node.lookup("apple").await;
        assert!(resp.is_success());
        assert_eq!(resp.value, Some(serde_json::json!("red")));
        node.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let node = Node::new("127.0.0.1", 0, None).await.unwrap();
        node.shutdown();
        node.shutdown();
    }

    #[tokio::test]
    async fn two_node_join_and_cross_store() {
        let a = Node::new("127.0.0.1", 0, None).await.unwrap();
        let bootstrap = NodeAddress::new(a.node_id(), "127.0.0.1", a.local_addr().port());
        let b = Node::new("127.0.0.1", 0, Some(bootstrap)).await.unwrap();

        let resp = b.store("banana", serde_json::json!("yellow")).await;
        assert!(resp.is_success());

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let resp = a.lookup("banana").await;
        assert!(resp.is_success());
        assert_eq!(resp.value, Some(serde_json::json!("yellow")));

        a.shutdown();
        b.shutdown();
    }
}
