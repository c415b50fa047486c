use anyhow::{Context, Result};
use derive_getters::Getters;
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Getters)]
pub struct AppConfig {
    server_host: String,
    server_port: u16,
    /// Unset means products live in memory for the life of the process.
    database_url: Option<String>,
    database_max_connections: u32,
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let server_port = match lookup("SERVER_PORT") {
            Some(port) => port
                .parse::<u16>()
                .with_context(|| format!("Invalid SERVER_PORT: {:?}", port))?,
            None => DEFAULT_PORT,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .with_context(|| format!("Invalid DATABASE_MAX_CONNECTIONS: {:?}", value))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            server_host,
            server_port,
            database_url,
            database_max_connections,
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid bind address {}:{}",
                    self.server_host, self.server_port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = config_from(&[])?;
        assert_eq!(config.server_host(), "127.0.0.1");
        assert_eq!(*config.server_port(), 8000);
        assert!(config.database_url().is_none());
        assert_eq!(*config.database_max_connections(), 5);
        assert_eq!(config.bind_address()?.to_string(), "127.0.0.1:8000");
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let config = config_from(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "9090"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "1"),
        ])?;
        assert_eq!(config.bind_address()?.to_string(), "0.0.0.0:9090");
        assert_eq!(config.database_url().as_deref(), Some("sqlite::memory:"));
        assert_eq!(*config.database_max_connections(), 1);
        Ok(())
    }

    #[test]
    fn test_invalid_port() {
        assert!(config_from(&[("SERVER_PORT", "http")]).is_err());
    }

    #[test]
    fn test_blank_database_url_means_memory() -> Result<()> {
        let config = config_from(&[("DATABASE_URL", "  ")])?;
        assert!(config.database_url().is_none());
        Ok(())
    }
}
