pub mod memory;
pub mod repository;
pub mod sqlite;

pub use memory::MemoryTable;
pub use repository::*;
pub use sqlite::SqliteTable;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::StorageConfig;
use crate::models::{
    DoseRecord, FamilyMember, HealthMetrics, HealthReport, Medication, Meta, User,
};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Stored record is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

impl DatabaseError {
    pub fn not_found<E: Entity>(id: &str) -> Self {
        DatabaseError::NotFound {
            entity_type: E::LABEL,
            id: id.to_string(),
        }
    }
}

/// A record type held in its own table.
///
/// `Draft` is the client payload for creation (no id, owner or timestamps);
/// `Patch` is the partial payload for updates, applied as a shallow merge.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Display name used in error bodies, e.g. "Medication not found".
    const LABEL: &'static str;
    /// Table name in every backend.
    const TABLE: &'static str;

    type Draft: DeserializeOwned + Send + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    fn from_draft(meta: Meta, draft: Self::Draft) -> Self;
    fn apply_patch(&mut self, patch: Self::Patch);
    fn meta(&self) -> &Meta;
    fn meta_mut(&mut self) -> &mut Meta;

    /// The table for this type inside a `Storage`.
    fn table(storage: &Storage) -> &dyn EntityStore<Self>;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn user_id(&self) -> &str {
        &self.meta().user_id
    }
}

/// Backend operations for one table.
///
/// Each call is atomic with respect to every other call on the same table:
/// `modify` and `remove` run their callback under the same lock (or
/// transaction) as the write they guard.
pub trait EntityStore<E: Entity>: Send + Sync {
    /// All rows owned by `user_id`, in insertion order.
    fn list(&self, user_id: &str) -> Result<Vec<E>, DatabaseError>;

    fn get(&self, id: &str) -> Result<Option<E>, DatabaseError>;

    fn insert(&self, entity: &E) -> Result<(), DatabaseError>;

    /// Load, mutate and store one row. `NotFound` when the id is absent;
    /// an error from `apply` aborts without writing.
    fn modify(
        &self,
        id: &str,
        apply: &mut dyn FnMut(&mut E) -> Result<(), DatabaseError>,
    ) -> Result<E, DatabaseError>;

    /// Remove the row if present and `keep_going` accepts it.
    /// Returns whether a row was removed.
    fn remove(&self, id: &str, keep_going: &dyn Fn(&E) -> bool) -> Result<bool, DatabaseError>;
}

/// One table per entity type, all on the same backend.
///
/// Constructed explicitly and handed to the router through `CoreState`.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn EntityStore<User>>,
    pub medications: Arc<dyn EntityStore<Medication>>,
    pub dose_records: Arc<dyn EntityStore<DoseRecord>>,
    pub health_reports: Arc<dyn EntityStore<HealthReport>>,
    pub health_metrics: Arc<dyn EntityStore<HealthMetrics>>,
    pub family_members: Arc<dyn EntityStore<FamilyMember>>,
    backend: &'static str,
}

impl Storage {
    /// Volatile map-backed tables.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryTable::new()),
            medications: Arc::new(MemoryTable::new()),
            dose_records: Arc::new(MemoryTable::new()),
            health_reports: Arc::new(MemoryTable::new()),
            health_metrics: Arc::new(MemoryTable::new()),
            family_members: Arc::new(MemoryTable::new()),
            backend: "memory",
        }
    }

    /// Tables on a single (already migrated) SQLite connection.
    pub fn sqlite(conn: rusqlite::Connection) -> Self {
        let conn = Arc::new(Mutex::new(conn));
        Self {
            users: Arc::new(SqliteTable::new(conn.clone())),
            medications: Arc::new(SqliteTable::new(conn.clone())),
            dose_records: Arc::new(SqliteTable::new(conn.clone())),
            health_reports: Arc::new(SqliteTable::new(conn.clone())),
            health_metrics: Arc::new(SqliteTable::new(conn.clone())),
            family_members: Arc::new(SqliteTable::new(conn)),
            backend: "sqlite",
        }
    }

    /// Build the backend selected by configuration.
    pub fn open(config: &StorageConfig) -> Result<Self, DatabaseError> {
        match config {
            StorageConfig::Memory => Ok(Self::in_memory()),
            StorageConfig::Sqlite { path } => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                let conn = sqlite::open_database(path)?;
                tracing::info!(path = %path.display(), "SQLite storage opened");
                Ok(Self::sqlite(conn))
            }
        }
    }

    /// Backend name, for logs and the health endpoint.
    pub fn backend(&self) -> &'static str {
        self.backend
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
