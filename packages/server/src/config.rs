//! Server configuration from command-line flags and environment variables.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Configuration errors that abort startup
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing REDIS_URL")]
    MissingRedisUrl,
}

/// Chat relay server configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-relay-server", version, about = "Horizontally scalable chat relay")]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Host to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Allowed CORS origin (`*` allows any origin)
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    /// Redis connection URL shared by the counter store and the broadcast bus
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Grace period before the shutdown correction, in milliseconds
    #[arg(long, env = "SHUTDOWN_GRACE_MS", default_value_t = 2000)]
    pub shutdown_grace_ms: u64,

    /// Timeout for a single counter store or bus call, in milliseconds
    #[arg(long, env = "BACKEND_TIMEOUT_MS", default_value_t = 5000)]
    pub backend_timeout_ms: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// Redis URL, required to start
    pub fn redis_url(&self) -> Result<&str, ConfigError> {
        self.redis_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingRedisUrl)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    /// Parse flags only, ignoring environment fallbacks such as `PORT`
    fn parse_flags(args: &[&str]) -> Result<ServerConfig, clap::Error> {
        let matches = ServerConfig::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)?;
        ServerConfig::from_arg_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        // テスト項目: フラグ未指定時のデフォルト値
        // when (操作):
        let config = parse_flags(&["chat-relay-server", "--redis-url", "redis://localhost:6379"]).unwrap();

        // then (期待する結果):
        assert_eq!(config.port, 3001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.shutdown_grace(), Duration::from_millis(2000));
        assert_eq!(config.backend_timeout(), Duration::from_millis(5000));
        assert_eq!(config.redis_url(), Ok("redis://localhost:6379"));
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse_flags(&[
            "chat-relay-server",
            "--port",
            "4000",
            "--host",
            "127.0.0.1",
            "--cors-origin",
            "*",
            "--redis-url",
            "redis://cache:6379",
            "--shutdown-grace-ms",
            "10",
        ])
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.cors_origin, "*");
        assert_eq!(config.shutdown_grace(), Duration::from_millis(10));
    }

    #[test]
    fn test_missing_redis_url() {
        // テスト項目: Redis URL が無い、または空の場合は起動できない
        let mut config = parse_flags(&["chat-relay-server"]).unwrap();
        config.redis_url = None;
        assert_eq!(config.redis_url(), Err(ConfigError::MissingRedisUrl));

        config.redis_url = Some(String::new());
        assert_eq!(config.redis_url(), Err(ConfigError::MissingRedisUrl));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = parse_flags(&["chat-relay-server", "--port", "70000"]);
        assert!(result.is_err());
    }
}
