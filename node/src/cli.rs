use clap::{Args, Parser, Subcommand};

/// The runtime/transport configuration surface: host, port, optional
/// bootstrap peer, log level, RPC timeouts, and connection limits.
/// Identifier geometry (`B`, `b`, rows, `L`) is deliberately *not* here —
/// it stays a compile-time `types::Config::default()` threaded explicitly
/// through `IdSpace`/`RoutingState`/`NodeServices`.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Starts a Pastry node and serves requests until shut down.
    Run(NodeConfig),
}

#[derive(Args, Debug, Clone)]
pub struct NodeConfig {
    /// Host this node advertises and binds to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port this node listens on.
    #[arg(long, default_value_t = 5000)]
    pub port: u16,
    /// Existing ring member to join through, as `host:port`.
    #[arg(long)]
    pub bootstrap: Option<String>,
    /// `tracing`/`log` filter string, e.g. `info` or `debug`.
    #[arg(long, default_value = "info")]
    pub log_level: String,
    /// Wall-clock bound on an outbound RPC's connect phase, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub rpc_connect_timeout_ms: u64,
    /// Wall-clock bound on an outbound RPC's read phase, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub rpc_read_timeout_ms: u64,
    /// Largest frame this node will read before giving up on a connection.
    #[arg(long, default_value_t = 1 << 20)]
    pub max_frame_bytes: u64,
    /// Largest number of simultaneously open inbound connections.
    #[arg(long, default_value_t = 256)]
    pub max_connections: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            bootstrap: None,
            log_level: "info".into(),
            rpc_connect_timeout_ms: 5000,
            rpc_read_timeout_ms: 5000,
            max_frame_bytes: 1 << 20,
            max_connections: 256,
        }
    }
}

impl NodeConfig {
    /// Parses `--bootstrap host:port` into its components, if present.
    pub fn bootstrap_parts(&self) -> Option<(String, u16)> {
        let raw = self.bootstrap.as_ref()?;
        let (host, port) = raw.rsplit_once(':')?;
        let port: u16 = port.parse().ok()?;
        Some((host.to_string(), port))
    }
}
