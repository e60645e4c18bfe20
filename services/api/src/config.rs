//! Runtime configuration read from the process environment

use anyhow::{Context, Result};
use common::database::DatabaseConfig;
use serde::Deserialize;

use crate::jwt::JwtConfig;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_TOKEN_EXPIRY_DAYS: i64 = 7;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub cors_allowed_origins: Vec<String>,
}

/// Everything the binary needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Flat view of the environment; keys arrive lowercased
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    jwt_secret_key: Option<String>,
    jwt_token_expiry_days: Option<i64>,
    database_url: Option<String>,
    database_name: Option<String>,
    database_max_connections: Option<u32>,
    database_min_connections: Option<u32>,
    database_connection_timeout: Option<u64>,
    bind_address: Option<String>,
    cors_allowed_origins: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", name))
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        let raw: RawSettings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("Failed to read environment")?
            .try_deserialize()
            .context("Invalid configuration value")?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let jwt = JwtConfig {
            secret: required(raw.jwt_secret_key, "JWT_SECRET_KEY")?,
            token_expiry_days: raw.jwt_token_expiry_days.unwrap_or(DEFAULT_TOKEN_EXPIRY_DAYS),
        };

        let mut database = DatabaseConfig::new(
            required(raw.database_url, "DATABASE_URL")?,
            required(raw.database_name, "DATABASE_NAME")?,
        );
        if let Some(max) = raw.database_max_connections {
            database.max_connections = max;
        }
        if let Some(min) = raw.database_min_connections {
            database.min_connections = min;
        }
        if let Some(timeout) = raw.database_connection_timeout {
            database.connection_timeout = timeout;
        }
        if database.min_connections > database.max_connections {
            anyhow::bail!(
                "DATABASE_MIN_CONNECTIONS ({}) exceeds DATABASE_MAX_CONNECTIONS ({})",
                database.min_connections,
                database.max_connections
            );
        }

        let cors_allowed_origins = raw
            .cors_allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            server: ServerConfig {
                bind_address: raw
                    .bind_address
                    .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
                cors_allowed_origins,
            },
            database,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        "JWT_SECRET_KEY",
        "JWT_TOKEN_EXPIRY_DAYS",
        "DATABASE_URL",
        "DATABASE_NAME",
        "DATABASE_MAX_CONNECTIONS",
        "DATABASE_MIN_CONNECTIONS",
        "DATABASE_CONNECTION_TIMEOUT",
        "BIND_ADDRESS",
        "CORS_ALLOWED_ORIGINS",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    fn set_required() {
        unsafe {
            std::env::set_var("JWT_SECRET_KEY", "an-adequately-long-signing-secret-value");
            std::env::set_var("DATABASE_URL", "postgres://localhost:5432");
            std::env::set_var("DATABASE_NAME", "lets_learn");
        }
    }

    #[test]
    #[serial]
    fn load_applies_defaults() {
        clear_env();
        set_required();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8000");
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(config.database.database_name, "lets_learn");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.token_expiry_days, 7);

        clear_env();
    }

    #[test]
    #[serial]
    fn load_reads_overrides() {
        clear_env();
        set_required();
        unsafe {
            std::env::set_var("DATABASE_MAX_CONNECTIONS", "25");
            std::env::set_var("JWT_TOKEN_EXPIRY_DAYS", "3");
            std::env::set_var("BIND_ADDRESS", "127.0.0.1:9000");
            std::env::set_var("CORS_ALLOWED_ORIGINS", "https://letslearn.app");
        }

        let config = AppConfig::load().unwrap();
        assert_eq!(config.database.max_connections, 25);
        assert_eq!(config.jwt.token_expiry_days, 3);
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.cors_allowed_origins, vec!["https://letslearn.app"]);

        clear_env();
    }

    #[test]
    #[serial]
    fn load_requires_secret() {
        clear_env();
        set_required();
        unsafe {
            std::env::remove_var("JWT_SECRET_KEY");
        }

        let err = AppConfig::load().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET_KEY"));

        clear_env();
    }

    #[test]
    fn pool_bounds_are_checked() {
        let raw = RawSettings {
            jwt_secret_key: Some("an-adequately-long-signing-secret-value".into()),
            database_url: Some("postgres://localhost".into()),
            database_name: Some("lets_learn".into()),
            database_max_connections: Some(2),
            database_min_connections: Some(5),
            ..Default::default()
        };
        assert!(AppConfig::from_raw(raw).is_err());
    }
}
