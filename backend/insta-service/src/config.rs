/// Configuration management for insta-service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use db_pool::env_utils::{env_flag, env_or, parse_env_with_default};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Store selection and database settings
    pub database: DatabaseConfig,
    /// Uploaded photo storage
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

/// Which repository implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" | "in-memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{}'", other),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Database URL; required for the postgres backend
    pub url: Option<String>,
    /// Apply bundled migrations at startup
    pub run_migrations: bool,
}

/// Media storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written to
    pub root: String,
    /// URL prefix under which stored files are served
    pub base_url: String,
    /// Largest accepted upload request body, in bytes
    pub max_upload_bytes: usize,
}

/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: env_or("APP_ENV", "development"),
            host: env_or("APP_HOST", "0.0.0.0"),
            http_port: parse_env_with_default("PORT", 8010),
            json_logs: env_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        };

        let backend: StoreBackend = env_or("STORE_BACKEND", "postgres")
            .parse()
            .context("Invalid STORE_BACKEND")?;
        let url = std::env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && url.is_none() {
            bail!("DATABASE_URL environment variable not set");
        }

        let media = MediaConfig {
            root: env_or("MEDIA_ROOT", "./media"),
            base_url: env_or("MEDIA_BASE_URL", "/media")
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: parse_env_with_default(
                "MEDIA_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
        };

        Ok(Config {
            app,
            database: DatabaseConfig {
                backend,
                url,
                run_migrations: env_flag("RUN_MIGRATIONS", true),
            },
            media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "PORT",
            "LOG_FORMAT",
            "STORE_BACKEND",
            "DATABASE_URL",
            "RUN_MIGRATIONS",
            "MEDIA_ROOT",
            "MEDIA_BASE_URL",
            "MEDIA_MAX_UPLOAD_BYTES",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_default_values() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://test");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8010);
        assert!(!config.app.json_logs);
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert_eq!(config.database.url.as_deref(), Some("postgres://test"));
        assert!(config.database.run_migrations);
        assert_eq!(config.media.root, "./media");
        assert_eq!(config.media.base_url, "/media");
        assert_eq!(config.media.max_upload_bytes, 10 * 1024 * 1024);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_postgres_requires_database_url() {
        clear_env();
        assert!(Config::from_env().is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_memory_backend_without_database_url() {
        clear_env();
        std::env::set_var("STORE_BACKEND", "memory");
        std::env::set_var("MEDIA_BASE_URL", "https://cdn.example.com/media/");
        std::env::set_var("RUN_MIGRATIONS", "false");
        std::env::set_var("MEDIA_MAX_UPLOAD_BYTES", "1048576");

        let config = Config::from_env().unwrap();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert!(config.database.url.is_none());
        assert!(!config.database.run_migrations);
        assert_eq!(config.media.max_upload_bytes, 1_048_576);
        assert_eq!(config.media.base_url, "https://cdn.example.com/media");

        clear_env();
    }

    #[test]
    fn test_parse_store_backend() {
        assert_eq!("PG".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!(
            "in-memory".parse::<StoreBackend>().unwrap(),
            StoreBackend::Memory
        );
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
