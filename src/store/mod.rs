//! Document persistence.
//!
//! The history of analyzed reports lives either in a remote table or in the
//! local per-user cache; which one is decided once, when the store is built
//! from configuration. The active dashboard slot is always local.

pub mod remote;
pub mod user_data;

pub use remote::{NewReportRow, RecordStoreClient, RemoteReportRow, RestRecordStore};
pub use user_data::{Dataset, MemoryUserData, SqliteUserData, UserDataRepository};

use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::db::DatabaseError;
use crate::identity::UserIdentity;
use crate::models::{ActiveDocument, AnalysisResult, DocumentRecord};
use user_data::{load_json, remove_dataset, save_json};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Local cache error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Remote store unreachable: {0}")]
    Remote(String),

    #[error("Remote store rejected request ({status}): {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Local cache lock poisoned")]
    LockPoisoned,
}

/// Where the document history lives.
pub enum StorageBackend {
    Remote(Box<dyn RecordStoreClient>),
    Local,
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Local => "local",
        }
    }
}

pub struct DocumentStore {
    backend: StorageBackend,
    cache: Arc<dyn UserDataRepository>,
}

impl DocumentStore {
    pub fn new(backend: StorageBackend, cache: Arc<dyn UserDataRepository>) -> Self {
        tracing::info!(backend = backend.name(), "Document store initialized");
        Self { backend, cache }
    }

    pub fn local(cache: Arc<dyn UserDataRepository>) -> Self {
        Self::new(StorageBackend::Local, cache)
    }

    /// Pick the backend from configuration: remote when credentials are
    /// configured, local otherwise.
    pub fn from_config(config: &AppConfig, cache: Arc<dyn UserDataRepository>) -> Result<Self, StoreError> {
        let backend = match &config.remote_store {
            Some(remote) => StorageBackend::Remote(Box::new(RestRecordStore::new(
                remote,
                config.http_timeout_secs,
            )?)),
            None => StorageBackend::Local,
        };
        Ok(Self::new(backend, cache))
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, StorageBackend::Remote(_))
    }

    /// All documents of a user, newest first.
    ///
    /// A failing remote read degrades to whatever the local cache holds for
    /// that user; the two sources are never merged.
    pub fn list_all(&self, user: &UserIdentity) -> Result<Vec<DocumentRecord>, StoreError> {
        match &self.backend {
            StorageBackend::Remote(client) => match client.list_reports(&user.id) {
                Ok(rows) => Ok(rows.into_iter().map(RemoteReportRow::into_record).collect()),
                Err(e) => {
                    tracing::warn!(error = %e, "Remote document list failed, using local cache");
                    self.load_local(user)
                }
            },
            StorageBackend::Local => self.load_local(user),
        }
    }

    /// Persist one newly analyzed document.
    ///
    /// Remote writes are best-effort: a failure is logged and swallowed, the
    /// caller still holds the record in memory.
    pub fn insert(&self, user: &UserIdentity, record: &DocumentRecord) -> Result<(), StoreError> {
        match &self.backend {
            StorageBackend::Remote(client) => {
                let row = NewReportRow {
                    user_id: &user.id,
                    file_name: &record.name,
                    analysis_json: &record.analysis,
                };
                if let Err(e) = client.insert_report(&row) {
                    tracing::warn!(file = %record.name, error = %e, "Remote insert failed");
                }
                Ok(())
            }
            StorageBackend::Local => {
                let mut records = self.load_local(user)?;
                records.insert(0, record.clone());
                save_json(self.cache.as_ref(), user.storage_key(), Dataset::Documents, &records)
            }
        }
    }

    /// Overwrite the local copy of a user's history. Only meaningful for the
    /// local backend; the remote table is already authoritative.
    pub fn sync_local(&self, user: &UserIdentity, records: &[DocumentRecord]) -> Result<(), StoreError> {
        match &self.backend {
            StorageBackend::Remote(_) => Ok(()),
            StorageBackend::Local => {
                save_json(self.cache.as_ref(), user.storage_key(), Dataset::Documents, records)
            }
        }
    }

    /// Promote a history document to the dashboard. Last writer wins.
    pub fn set_active(&self, user: &UserIdentity, record: &DocumentRecord) -> Result<(), StoreError> {
        self.save_active(user, &ActiveDocument::from(record))
    }

    /// Show an analysis that has no history entry.
    pub fn set_active_analysis(&self, user: &UserIdentity, analysis: &AnalysisResult) -> Result<(), StoreError> {
        self.save_active(user, &ActiveDocument::from(analysis.clone()))
    }

    pub fn get_active(&self, user: &UserIdentity) -> Result<Option<ActiveDocument>, StoreError> {
        load_json(self.cache.as_ref(), user.storage_key(), Dataset::ActiveAnalysis)
    }

    fn save_active(&self, user: &UserIdentity, active: &ActiveDocument) -> Result<(), StoreError> {
        save_json(self.cache.as_ref(), user.storage_key(), Dataset::ActiveAnalysis, active)
    }

    pub fn clear_active(&self, user: &UserIdentity) -> Result<(), StoreError> {
        remove_dataset(self.cache.as_ref(), user.storage_key(), Dataset::ActiveAnalysis)
    }

    fn load_local(&self, user: &UserIdentity) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(load_json(self.cache.as_ref(), user.storage_key(), Dataset::Documents)?.unwrap_or_default())
    }
}
