//! Tracing initialization.
//!
//! Structured logging through `tracing` with an `EnvFilter`: set `RUST_LOG`
//! to adjust verbosity (e.g. `RUST_LOG=boulevard=debug,tower_http=debug`).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("boulevard=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
