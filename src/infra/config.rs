//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, bail, Context};
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which movie store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = match get("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("postgres") => StorageBackend::Postgres {
                database_url: get("DATABASE_URL")
                    .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?,
                max_connections: parse_or(
                    "DB_MAX_CONNECTIONS",
                    get("DB_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?
                .max(1),
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => bail!(
                "STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'",
                other
            ),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            storage,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a valid number, got '{}'", key, v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/movies")]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
        assert_eq!(
            cfg.storage,
            StorageBackend::Postgres {
                database_url: "postgres://localhost/movies".to_string(),
                max_connections: DEFAULT_MAX_CONNECTIONS,
            }
        );
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let cfg = config(&[("STORAGE_BACKEND", "memory"), ("PORT", "8080")]).unwrap();
        assert_eq!(cfg.storage, StorageBackend::Memory);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("STORAGE_BACKEND", "mongo")]).is_err());
        let err = config(&[("STORAGE_BACKEND", "memory"), ("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
