use tracing::subscriber::set_global_default;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Installs the process-wide `tracing` subscriber: an `EnvFilter` driven by
/// `log_level` (falling back to `info`) plus a human-readable `fmt` layer on
/// stdout.
pub fn init_tracing(log_level: Option<&str>) {
    let env_filter =
        EnvFilter::try_new(log_level.unwrap_or("info")).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(true);
    let subscriber = Registry::default().with(env_filter).with(stdout_layer);
    let _ = set_global_default(subscriber);
    let _ = tracing_log::LogTracer::init();
}

/// No-op today; kept as the single place shutdown-time flushing would hook
/// in if a span exporter is ever added back.
pub fn shutdown_tracing() {}
