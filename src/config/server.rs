//! Status server configuration.

use std::net::SocketAddr;

use super::parse::env_parse;
use super::ConfigError;

/// Status server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address the status server binds to (LISTEN_ADDR).
    pub listen_addr: SocketAddr,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen_addr: env_parse("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
        })
    }
}
