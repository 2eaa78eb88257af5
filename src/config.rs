use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// 永続化バックエンドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                value: other.to_string(),
                reason: "expected `postgres` or `memory`".to_string(),
            }),
        }
    }
}

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                         | Default                        |
/// |---------------------------------|--------------------------------|
/// | `HOST`                          | `0.0.0.0`                      |
/// | `PORT`                          | `3000`                         |
/// | `DATABASE_URL`                  | `postgres://localhost/library` |
/// | `DATABASE_MAX_CONNECTIONS`      | `5`                            |
/// | `DATABASE_ACQUIRE_TIMEOUT_SECS` | `5`                            |
/// | `REQUEST_TIMEOUT_SECS`          | `30`                           |
/// | `STORAGE_BACKEND`               | `postgres`                     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub request_timeout: Duration,
    pub storage_backend: StorageBackend,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse("PORT", var("PORT", "3000"))?,
            database_url: var("DATABASE_URL", "postgres://localhost/library"),
            database_max_connections: parse(
                "DATABASE_MAX_CONNECTIONS",
                var("DATABASE_MAX_CONNECTIONS", "5"),
            )?,
            database_acquire_timeout: Duration::from_secs(parse(
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                var("DATABASE_ACQUIRE_TIMEOUT_SECS", "5"),
            )?),
            request_timeout: Duration::from_secs(parse(
                "REQUEST_TIMEOUT_SECS",
                var("REQUEST_TIMEOUT_SECS", "30"),
            )?),
            storage_backend: var("STORAGE_BACKEND", "postgres").parse()?,
        })
    }

    /// `host:port` for the TCP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "postgres://localhost/library");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("STORAGE_BACKEND", "Memory"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.storage_backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_invalid_backend() {
        let err = config_from(&[("STORAGE_BACKEND", "sqlite")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                ..
            }
        ));
    }
}
