use clap::Parser;
use std::error::Error;

use node::cli::{Cli, Commands};
use node::net::client::RpcTimeouts;
use node::net::listener::ListenerLimits;
use node::Node;
use std::time::Duration;
use types::{Config, IdSpace, NodeAddress};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(node_config) => {
            tracer::init_tracing(Some(&node_config.log_level));

            let bootstrap = node_config.bootstrap_parts().map(|(host, port)| {
                let idspace = IdSpace::new(Config::default());
                // The bootstrap's real id is learned from its JOIN reply
                // (see NodeServices::join); this placeholder id is only
                // used to open the initial connection.
                let placeholder_id = idspace.hash(format!("{host}:{port}").as_bytes());
                NodeAddress::new(placeholder_id, host, port)
            });

            let rpc_timeouts = RpcTimeouts {
                connect: Duration::from_millis(node_config.rpc_connect_timeout_ms),
                read: Duration::from_millis(node_config.rpc_read_timeout_ms),
            };
            let limits = ListenerLimits {
                max_connections: node_config.max_connections,
                max_frame_bytes: node_config.max_frame_bytes,
            };

            let node = Node::with_config(
                node_config.host.clone(),
                node_config.port,
                bootstrap,
                Config::default(),
                rpc_timeouts,
                limits,
            )
            .await?;

            log::info!(
                "pastry node {} listening on {}",
                node.node_id(),
                node.local_addr()
            );

            tokio::signal::ctrl_c().await?;
            node.shutdown();
            node.wait_for_shutdown().await;
        }
    }
    Ok(())
}
