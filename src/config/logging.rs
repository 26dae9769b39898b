//! Logging configuration.

use std::path::PathBuf;

use super::parse::{env_opt, env_or};
use super::ConfigError;

/// Default filter: the probe only speaks up about problems.
const DEFAULT_FILTER: &str = "judge_probe=warn";

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable `tracing_subscriber::fmt` output.
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    /// Output format (LOG_FORMAT).
    pub format: LogFormat,
    /// Append logs to this file instead of stderr (LOG_PATH).
    pub log_path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: judge_probe=debug,hyper=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        let filter = resolve_log_filter(env_opt("LOG_LEVEL"), env_opt("RUST_LOG"));
        let format = match env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            filter,
            service_name: env_or("SERVICE_NAME", "judge_probe"),
            format,
            log_path: env_opt("LOG_PATH").map(PathBuf::from),
        })
    }
}

/// Resolve the log filter from LOG_LEVEL and RUST_LOG values.
fn resolve_log_filter(log_level: Option<String>, rust_log: Option<String>) -> String {
    // 1. LOG_LEVEL (simple: debug, info, warn, error)
    if let Some(level) = log_level {
        let level = level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                return format!("judge_probe={}", level);
            }
            _ => {
                // Logging is not up yet
                eprintln!(
                    "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                    level
                );
            }
        }
    }

    // 2. RUST_LOG (full tracing filter syntax)
    if let Some(filter) = rust_log {
        return filter;
    }

    DEFAULT_FILTER.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_priority() {
        assert_eq!(resolve_log_filter(None, None), "judge_probe=warn");

        assert_eq!(
            resolve_log_filter(None, Some("judge_probe=info,hyper=debug".into())),
            "judge_probe=info,hyper=debug"
        );

        // LOG_LEVEL takes priority over RUST_LOG
        assert_eq!(
            resolve_log_filter(Some("DEBUG".into()), Some("judge_probe=info".into())),
            "judge_probe=debug"
        );

        // Invalid LOG_LEVEL falls through
        assert_eq!(
            resolve_log_filter(Some("loud".into()), None),
            "judge_probe=warn"
        );
    }
}
