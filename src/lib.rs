use axum::extract::FromRef;

pub mod clock;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod error;
pub mod keys;
pub mod models;
pub mod pages;
pub mod storage;
pub mod types;

use clock::Clock;
use config::{Config, StorageKind};
pub use error::{ApiError, ApiResult};
use storage::{AnyStore, MemoryStore};

/// Everything a request handler needs. Cheap to clone.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub clock: Clock,
    pub store: AnyStore,
}

impl App {
    pub fn new(config: Config, store: impl Into<AnyStore>) -> Self {
        App {
            clock: Clock::new(config.test_mode),
            config,
            store: store.into(),
        }
    }

    /// Open the configured store and build the app around it.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        let store: AnyStore = match config.storage.kind {
            StorageKind::Memory => MemoryStore::new().into(),
            #[cfg(feature = "sqlite")]
            StorageKind::Sqlite => {
                use anyhow::Context;
                storage::SqliteStore::connect(&config.storage.sqlite.url)
                    .await
                    .context("failed to open sqlite store")?
                    .into()
            }
        };
        Ok(App::new(config, store))
    }
}
