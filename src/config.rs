use std::net::IpAddr;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable prefix for configuration overrides, e.g. `PASTEBIN_PORT`.
pub const ENV_PREFIX: &str = "PASTEBIN";

/// Environment variable that turns on the test-mode clock when set to `1`.
pub const TEST_MODE_VAR: &str = "TEST_MODE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub bind: IpAddr,
    pub port: u16,
    #[serde(default)]
    pub test_mode: bool,
    pub storage: Storage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub kind: StorageKind,
    #[cfg(feature = "sqlite")]
    pub sqlite: SqliteStorage,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg(feature = "sqlite")]
pub struct SqliteStorage {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl Config {
    /// Load configuration from an optional TOML file, overridden by
    /// `PASTEBIN_*` environment variables (`__` separates nested keys).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .set_default("base_url", "http://localhost:3000")?
            .set_default("bind", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("storage.kind", "memory")?;
        #[cfg(feature = "sqlite")]
        let builder = builder.set_default("storage.sqlite.url", "sqlite:ttlbin.db")?;

        let mut config: Config = builder
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("failed to read config")?
            .try_deserialize()
            .context("failed to deserialize config")?;

        if std::env::var(TEST_MODE_VAR).is_ok_and(|v| v == "1") {
            config.test_mode = true;
        }
        config.base_url = config.base_url.trim_end_matches('/').to_owned();

        Ok(config)
    }
}
