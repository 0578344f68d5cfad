//! Server configuration from environment variables

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Row file (CSV or JSON) loaded at startup and on reload. The
    /// server still starts without one, serving an empty snapshot.
    pub data_path: Option<String>,

    /// HTTP bind address (default: 0.0.0.0:8080)
    pub http_bind: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let data_path = env::var("LUFT_DATA_PATH").ok().filter(|p| !p.is_empty());

        let http_bind =
            env::var("LUFT_HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        http_bind
            .parse::<std::net::SocketAddr>()
            .context("Invalid LUFT_HTTP_BIND")?;

        Ok(Self {
            data_path,
            http_bind,
        })
    }
}
