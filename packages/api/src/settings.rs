//! # Server configuration
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML file (`hostclip.toml` unless another path is given), then
//! environment variables prefixed with `HOSTCLIP` and using `__` between
//! sections, e.g. `HOSTCLIP__SERVER__PORT=8080`. A `.env` file is loaded first
//! via `dotenvy`, and `DATABASE_URL`, when set, wins over the assembled
//! database URL.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! public_url = "http://192.168.1.6:3000"
//!
//! [storage]
//! backend = "postgres"   # or "memory"
//!
//! [database]
//! host = "localhost"
//! max_connections = 5
//!
//! [poll]
//! interval_secs = 3
//! ```

use std::time::Duration;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "hostclip.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Base URL embedded in session links and QR codes.
    pub public_url: String,
    pub max_body_bytes: usize,
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
}

impl Database {
    pub fn url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    pub interval_secs: u64,
}

impl Poll {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub storage: Storage,
    pub database: Database,
    pub poll: Poll,
}

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let file = File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE))
            .format(FileFormat::Toml)
            .required(path.is_some());

        let mut builder = defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix("HOSTCLIP").separator("__"));
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        builder.build()?.try_deserialize()
    }

    /// Load settings from defaults plus an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: Server {
                host: "0.0.0.0".into(),
                port: 3000,
                public_url: "http://localhost:3000".into(),
                max_body_bytes: 25 * 1024 * 1024,
            },
            storage: Storage {
                backend: StorageBackend::Memory,
            },
            database: Database {
                url: None,
                user: "hostclip".into(),
                password: "password".into(),
                host: "localhost".into(),
                port: 5432,
                database: "hostclip".into(),
                max_connections: 5,
            },
            poll: Poll { interval_secs: 3 },
        }
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.public_url", "http://localhost:3000")?
        .set_default("server.max_body_bytes", 25 * 1024 * 1024)?
        .set_default("storage.backend", "memory")?
        .set_default("database.user", "hostclip")?
        .set_default("database.password", "password")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.database", "hostclip")?
        .set_default("database.max_connections", 5)?
        .set_default("poll.interval_secs", 3)
}
