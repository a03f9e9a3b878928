//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can
//! be specified via `-f` flag or the `BOULEVARD_CONFIG` environment
//! variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources
//! override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `BOULEVARD_`
//!    override YAML values; nested keys use double underscores, e.g.
//!    `BOULEVARD_AUTH__JWT_EXPIRY=2h`
//! 3. **DATABASE_URL** - Special case: forces the external database backend
//!
//! The JWT signing key and the database connection settings are read here
//! once at startup and handed to the services through `AppState`; nothing in
//! the request path reads the environment.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "BOULEVARD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Database backend configuration
    pub database: DatabaseConfig,
    /// Secret key for JWT signing (required for production)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Logo upload configuration
    pub uploads: UploadsConfig,
    /// CORS allowed origins; "*" allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: DatabaseConfig::Memory,
            secret_key: None,
            auth: AuthConfig::default(),
            uploads: UploadsConfig::default(),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Database backend - either in-process memory or external PostgreSQL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatabaseConfig {
    /// Keep all state in process memory. Nothing survives a restart;
    /// development and testing only.
    Memory,
    /// Use an external PostgreSQL database.
    External {
        /// Primary database URL
        url: String,
        /// Connection pool settings
        #[serde(default)]
        pool: PoolSettings,
    },
}

impl DatabaseConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        match self {
            DatabaseConfig::Memory => PoolSettings::default(),
            DatabaseConfig::External { pool, .. } => pool.clone(),
        }
    }
}

/// Connection pool settings for the PostgreSQL backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// How long issued tokens stay valid
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    /// Issuer claim stamped into and required from every token
    pub issuer: String,
    /// Audience claim stamped into and required from every token
    pub audience: String,
    /// Password length bounds checked at registration
    pub password: PasswordConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
            issuer: "boulevard".to_string(),
            audience: "boulevard-clients".to_string(),
            password: PasswordConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

/// Logo upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory logo files are written to and served from
    pub directory: PathBuf,
    /// Maximum accepted logo size in bytes
    pub max_logo_size: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("uploads"),
            max_logo_size: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from the YAML file and environment overrides.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("BOULEVARD_").split("__"))
            .extract()?;

        // DATABASE_URL forces the external backend, keeping any configured
        // pool settings.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            let pool = config.database.pool_settings();
            config.database = DatabaseConfig::External { url, pool };
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
