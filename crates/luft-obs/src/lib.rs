//! Logging/tracing initialization shared by the luft binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,luft=debug";

/// Install the global tracing subscriber: JSON lines on stdout, filter
/// from `RUST_LOG` with a service-appropriate default. Safe to call more
/// than once; later calls keep the first subscriber.
pub fn init(service: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service, "observability initialized");
    }
}
