//! Per-user JSON datasets in the local cache.
//!
//! Each dataset lives under `"<namespace>_<user>"`. Values are JSON text;
//! a value that no longer parses is logged and treated as absent so one bad
//! write never locks a user out of their history.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;
use crate::db::{self, DatabaseError};

/// Logical datasets kept per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Analyzed report history.
    Documents,
    /// The document driving the dashboard.
    ActiveAnalysis,
    /// Consultation transcript.
    PlanChat,
    /// Completed exercise sessions.
    SessionLog,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Documents => "user_documents",
            Self::ActiveAnalysis => "dashboard_analysis",
            Self::PlanChat => "physio_chat",
            Self::SessionLog => "physio_history",
        }
    }

    pub fn key_for(&self, user_key: &str) -> String {
        format!("{}_{}", self.as_str(), user_key)
    }
}

/// Raw JSON access to one user's datasets in the local cache.
pub trait UserDataRepository: Send + Sync {
    fn get(&self, user_key: &str, dataset: Dataset) -> Result<Option<String>, StoreError>;
    fn set(&self, user_key: &str, dataset: Dataset, value: &str) -> Result<(), StoreError>;
    fn remove(&self, user_key: &str, dataset: Dataset) -> Result<(), StoreError>;
}

/// Read and decode a dataset. Missing and malformed data both yield None.
pub fn load_json<T: DeserializeOwned>(
    repo: &dyn UserDataRepository,
    user_key: &str,
    dataset: Dataset,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = repo.get(user_key, dataset)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(
                dataset = dataset.as_str(),
                user = %user_key,
                error = %e,
                "Discarding malformed cached dataset"
            );
            Ok(None)
        }
    }
}

/// Encode and overwrite a dataset.
pub fn save_json<T: Serialize + ?Sized>(
    repo: &dyn UserDataRepository,
    user_key: &str,
    dataset: Dataset,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    repo.set(user_key, dataset, &raw)
}

pub fn remove_dataset(
    repo: &dyn UserDataRepository,
    user_key: &str,
    dataset: Dataset,
) -> Result<(), StoreError> {
    repo.remove(user_key, dataset)
}

// ═══════════════════════════════════════════
// SQLite-backed cache
// ═══════════════════════════════════════════

pub struct SqliteUserData {
    conn: Mutex<Connection>,
}

impl SqliteUserData {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        Ok(Self::new(db::open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(db::open_memory_database()?))
    }

    fn with_conn<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, DatabaseError>,
    ) -> Result<R, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&conn)?)
    }
}

impl UserDataRepository for SqliteUserData {
    fn get(&self, user_key: &str, dataset: Dataset) -> Result<Option<String>, StoreError> {
        let key = dataset.key_for(user_key);
        self.with_conn(|conn| db::get_dataset(conn, &key))
    }

    fn set(&self, user_key: &str, dataset: Dataset, value: &str) -> Result<(), StoreError> {
        let key = dataset.key_for(user_key);
        self.with_conn(|conn| db::set_dataset(conn, &key, value))
    }

    fn remove(&self, user_key: &str, dataset: Dataset) -> Result<(), StoreError> {
        let key = dataset.key_for(user_key);
        self.with_conn(|conn| db::delete_dataset(conn, &key))
    }
}

// ═══════════════════════════════════════════
// In-memory cache
// ═══════════════════════════════════════════

#[derive(Default)]
pub struct MemoryUserData {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryUserData {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserDataRepository for MemoryUserData {
    fn get(&self, user_key: &str, dataset: Dataset) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(&dataset.key_for(user_key)).cloned())
    }

    fn set(&self, user_key: &str, dataset: Dataset, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(dataset.key_for(user_key), value.to_string());
        Ok(())
    }

    fn remove(&self, user_key: &str, dataset: Dataset) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries.remove(&dataset.key_for(user_key));
        Ok(())
    }
}
