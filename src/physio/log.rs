use std::sync::Arc;

use crate::models::SessionEntry;
use crate::store::user_data::{load_json, save_json, Dataset, UserDataRepository};
use crate::store::StoreError;

/// A user's append-only list of completed sessions, oldest first.
pub struct SessionLog {
    repo: Arc<dyn UserDataRepository>,
    user_key: String,
    entries: Vec<SessionEntry>,
}

impl SessionLog {
    /// Load the log for `user_key`. A missing or unreadable log starts empty.
    pub fn load(repo: Arc<dyn UserDataRepository>, user_key: &str) -> Result<Self, StoreError> {
        let entries = load_json(repo.as_ref(), user_key, Dataset::SessionLog)?.unwrap_or_default();
        Ok(Self {
            repo,
            user_key: user_key.to_string(),
            entries,
        })
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Append and persist. The entry stays in memory even if the write fails.
    pub fn append(&mut self, entry: SessionEntry) -> Result<(), StoreError> {
        self.entries.push(entry);
        save_json(self.repo.as_ref(), &self.user_key, Dataset::SessionLog, &self.entries)
    }

    pub fn total_minutes(&self) -> u32 {
        self.entries.iter().map(|e| e.duration).sum()
    }
}
