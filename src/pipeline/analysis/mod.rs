pub mod file;
pub mod http;

pub use file::*;
pub use http::HttpAnalysisClient;

use thiserror::Error;

use crate::models::AnalysisResult;

/// Failure to analyze one file. Never fatal to a batch.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Cannot read {file}: {reason}")]
    ReadFailed { file: String, reason: String },

    #[error("File too large ({size_bytes} bytes)")]
    FileTooLarge { size_bytes: u64 },

    #[error("Invalid file type {mime_type}. Allowed: PDF, JPEG, PNG, WEBP")]
    UnsupportedType { mime_type: String },

    #[error("Cannot reach analysis service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Service answered with a non-success status. `message` is the
    /// service's `detail`, or a generic per-file message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unreadable analysis response: {0}")]
    ResponseParsing(String),
}

/// The external analysis service.
pub trait AnalysisClient {
    fn analyze(&self, file: &ReportFile) -> Result<AnalysisResult, AnalysisError>;
}
