//! Application configuration loaded from environment variables.

use std::env;

use actix_web::cookie::Key;

use quill_infra::DatabaseConfig;

/// Falls back to a local embedded store when DATABASE_URL is unset.
const DEFAULT_DATABASE_URL: &str = "sqlite://blog.db?mode=rwc";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub secret_key: Option<String>,
    pub cookie_secure: bool,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            secret_key: env::var("SECRET_KEY").ok(),
            cookie_secure: env::var("COOKIE_SECURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            database,
        }
    }

    /// Session-signing key. Derived from SECRET_KEY when set; otherwise
    /// a fresh key is generated and sessions will not survive a
    /// restart.
    pub fn session_key(&self) -> Key {
        match &self.secret_key {
            Some(secret) if secret.len() >= 32 => Key::derive_from(secret.as_bytes()),
            Some(_) => {
                tracing::error!(
                    "SECRET_KEY is shorter than 32 bytes; generating an ephemeral key instead"
                );
                Key::generate()
            }
            None => {
                tracing::warn!(
                    "SECRET_KEY not set; sessions will be invalidated on restart. \
                     Set SECRET_KEY for production use."
                );
                Key::generate()
            }
        }
    }
}
