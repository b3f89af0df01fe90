//! Types for the batch ingestion pipeline.

use serde::Serialize;

use crate::models::DocumentRecord;

// ═══════════════════════════════════════════
// Item status
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Succeeded,
    Failed { error: String },
}

impl ItemStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

// ═══════════════════════════════════════════
// Progress
// ═══════════════════════════════════════════

/// Which file is being analyzed right now (0-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionProgress {
    pub current_index: usize,
    pub total: usize,
    pub current_file: String,
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum IngestionEvent {
    Started {
        job_id: String,
        total: usize,
    },
    Progress(IngestionProgress),
    ItemSucceeded {
        index: usize,
        file_name: String,
    },
    ItemFailed {
        index: usize,
        error: String,
    },
    Completed {
        succeeded: usize,
        failed: usize,
        duration_ms: u64,
    },
}

// ═══════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════

/// Result of draining the queue.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionOutcome {
    /// Records created by this batch, in queue order.
    pub completed: Vec<DocumentRecord>,
    /// One `Error on <file>: <message>` line per failed file, in queue order.
    pub errors: Vec<String>,
    /// The error the user sees after the batch.
    pub last_error: Option<String>,
    /// New records followed by the previously known ones.
    pub documents: Vec<DocumentRecord>,
}

impl IngestionOutcome {
    pub fn empty(existing: &[DocumentRecord]) -> Self {
        Self {
            completed: Vec::new(),
            errors: Vec::new(),
            last_error: None,
            documents: existing.to_vec(),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }
}

/// Message recorded for a file the service could not analyze.
pub fn item_error_message(file_name: &str, error: &impl std::fmt::Display) -> String {
    format!("Error on {file_name}: {error}")
}
