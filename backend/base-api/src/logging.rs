use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber. Honors `RUST_LOG`, defaulting to
/// `info` for the service and its security libraries.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,base_api=debug,xss_guard=info,actix_middleware=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
