use std::net::SocketAddr;

use crate::error::{BridgeError, BridgeResult};

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub cors_origin: String,
    pub max_body_size: usize,
    pub log_filter: String,
}

impl ServerConfig {
    pub fn from_env() -> BridgeResult<Self> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> BridgeResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let address = get("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into());
        let address = address
            .parse::<SocketAddr>()
            .map_err(|e| BridgeError::Config(format!("ADDRESS {address:?}: {e}")))?;

        let cors_origin = get("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into());
        if cors_origin.trim().is_empty() || cors_origin.trim() == "*" {
            return Err(BridgeError::Config(
                "CORS_ALLOWED_ORIGIN must name a single origin".into(),
            ));
        }

        let max_body_size = match get("MAX_HTTP_BODY_SIZE") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                BridgeError::Config(format!("MAX_HTTP_BODY_SIZE must be an integer, got {raw:?}"))
            })?,
            None => DEFAULT_MAX_BODY_SIZE,
        };

        // `GARMIN_BRIDGE_LOG_LEVEL` wins over `RUST_LOG`; default `info`.
        let log_filter = get("GARMIN_BRIDGE_LOG_LEVEL")
            .or_else(|| get("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            address,
            cors_origin: cors_origin.trim().to_string(),
            max_body_size,
            log_filter,
        })
    }
}
