//! Batch ingestion: selected report files are analyzed strictly in order,
//! one request at a time, and each success is persisted as a document.

pub mod job;
pub mod queue;
pub mod types;

pub use job::{IngestionItem, IngestionJob};
pub use queue::{analyze_single, DocumentIngestionQueue};
pub use types::*;
