//! Configuration module for judge_probe.
//!
//! This module provides centralized configuration loading from environment variables.
//! The `TOKEN` credential is required; everything else has a default.
//!
//! # Example
//!
//! ```rust,ignore
//! use judge_probe::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! ```

mod error;
mod logging;
mod parse;
mod server;
mod system;
mod token;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use system::SystemConfig;
pub use token::{load_token, Token, TOKEN_ENV};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Digest of the shared secret.
    pub token: Token,
    /// Status server configuration.
    pub server: ServerConfig,
    /// Capacity detection configuration.
    pub system: SystemConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The credential is checked first so a missing `TOKEN` fails before
    /// anything else is parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = load_token()?;

        Ok(Self {
            token,
            server: ServerConfig::from_env()?,
            system: SystemConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Cgroup root: {}", self.system.cgroup_root.display());
        info!("  Judger version: {}", self.system.judger_version);
        info!("  Log format: {:?}", self.logging.format);

        if let Some(ref path) = self.logging.log_path {
            info!("  Log file: {}", path.display());
        }
    }
}
