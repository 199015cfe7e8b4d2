//! Environment-driven configuration.

use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Reads the configuration from the process environment.
pub fn load() -> Result<AppConfig> {
    from_lookup(|name| std::env::var(name).ok())
}

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

    Ok(AppConfig {
        server: ServerConfig {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "SERVER_PORT", 3002)?,
        },
        database: DatabaseConfig {
            url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        },
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not valid: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = from_lookup(env(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();

        assert_eq!(config.server.socket_addr(), "0.0.0.0:3002");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.url, "postgres://localhost/shop");
    }

    #[test]
    fn database_url_is_required() {
        let err = from_lookup(env(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_port_names_the_variable() {
        let err = from_lookup(env(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("SERVER_PORT", "http"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
