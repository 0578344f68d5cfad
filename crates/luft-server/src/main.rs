//! Luft HTTP service - loads the row file and serves sensor records,
//! the forecast day index, and per-day resolved values.

use std::net::SocketAddr;
use tokio::net::TcpListener;

use luft_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Observability
    luft_obs::init("luft-server");

    // Config
    let cfg = match ServerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = ?e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Build app and state
    let (app, state) = luft_server::build_app(cfg.data_path.clone());

    // Initial load. Noisy upstream data must not prevent startup; the
    // reload endpoint can retry once the file is in place.
    if cfg.data_path.is_some() {
        match luft_server::load_snapshot(&state).await {
            Ok(sensors) => tracing::info!(sensors, "initial row file loaded"),
            Err(e) => tracing::warn!(error = ?e, "initial load failed, serving empty snapshot"),
        }
    } else {
        tracing::warn!("LUFT_DATA_PATH not set, serving empty snapshot");
    }

    // Start HTTP server
    let addr: SocketAddr = cfg.http_bind.parse().expect("Invalid HTTP bind address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind TCP listener");

    // Mark ready just before serving
    luft_server::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.expect("server error");
}
