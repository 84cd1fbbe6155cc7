use thiserror::Error;

use crate::models::PasteRecord;

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("database error")]
    #[cfg(feature = "sqlite")]
    Database {
        #[from]
        source: sqlx::Error,
    },
    #[error("invalid stored record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },
}

/// Backing store for paste records, keyed by bare paste id.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// Get a record by id.
    async fn get(&self, id: &str) -> StoreResult<Option<PasteRecord>>;

    /// Put a record, replacing whatever was stored at `id`.
    async fn set(&self, id: &str, record: PasteRecord) -> StoreResult<()>;

    /// Check whether any record is stored at `id`, visible or not.
    async fn has(&self, id: &str) -> StoreResult<bool>;

    /// Count one view of the record at `id` if it is visible at `now`.
    ///
    /// The visibility check and the increment happen as one step, so
    /// concurrent callers can never push `views` past `max_views`. Returns
    /// the updated record, or `None` if it is missing, expired or exhausted.
    async fn record_view(&self, id: &str, now: i64) -> StoreResult<Option<PasteRecord>>;

    /// Check that the store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

#[derive(Clone)]
pub enum AnyStore {
    Memory(MemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteStore),
}

impl Store for AnyStore {
    async fn get(&self, id: &str) -> StoreResult<Option<PasteRecord>> {
        match self {
            AnyStore::Memory(memory) => memory.get(id).await,
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(sqlite) => sqlite.get(id).await,
        }
    }

    async fn set(&self, id: &str, record: PasteRecord) -> StoreResult<()> {
        match self {
            AnyStore::Memory(memory) => memory.set(id, record).await,
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(sqlite) => sqlite.set(id, record).await,
        }
    }

    async fn has(&self, id: &str) -> StoreResult<bool> {
        match self {
            AnyStore::Memory(memory) => memory.has(id).await,
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(sqlite) => sqlite.has(id).await,
        }
    }

    async fn record_view(&self, id: &str, now: i64) -> StoreResult<Option<PasteRecord>> {
        match self {
            AnyStore::Memory(memory) => memory.record_view(id, now).await,
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(sqlite) => sqlite.record_view(id, now).await,
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        match self {
            AnyStore::Memory(memory) => memory.ping().await,
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(sqlite) => sqlite.ping().await,
        }
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(value: MemoryStore) -> Self {
        AnyStore::Memory(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<SqliteStore> for AnyStore {
    fn from(value: SqliteStore) -> Self {
        AnyStore::Sqlite(value)
    }
}
