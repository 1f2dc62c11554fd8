//! Logging initialization
//! Human-readable output by default; bunyan-style JSON lines when
//! `OVERTHINKR_LOG_JSON=1` so logs can be shipped and queried.

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Call once at process start.
pub fn init(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("OVERTHINKR_LOG_JSON")
        .map(|v| v == "1")
        .unwrap_or(false);

    if json {
        let formatting_layer = BunyanFormattingLayer::new(service_name.to_string(), std::io::stdout);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(formatting_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
