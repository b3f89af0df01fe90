use std::path::Path;

use serde::Serialize;

use super::AnalysisError;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_WEBP: &str = "image/webp";

/// Types the analysis service accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_JPEG, MIME_PNG, MIME_WEBP];

const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024; // 50MB

/// A report file selected for analysis, held in memory until submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFile {
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ReportFile {
    /// Wrap in-memory content. The MIME type comes from magic bytes, then
    /// from the file extension.
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        let name = sanitize_filename(name);
        let mime_type = detect_mime(&bytes, &name);
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let display = path.display().to_string();
        let read_failed = |e: std::io::Error| AnalysisError::ReadFailed {
            file: display.clone(),
            reason: e.to_string(),
        };

        let size = std::fs::metadata(path).map_err(read_failed)?.len();
        if size > MAX_FILE_SIZE {
            return Err(AnalysisError::FileTooLarge { size_bytes: size });
        }
        let bytes = std::fs::read(path).map_err(read_failed)?;
        Ok(Self::new(&display, bytes))
    }

    pub fn is_supported(&self) -> bool {
        ACCEPTED_MIME_TYPES.contains(&self.mime_type.as_str())
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Detect the MIME type from magic bytes. Extensions are only a fallback.
pub fn detect_mime(bytes: &[u8], name: &str) -> String {
    let sniffed = match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => Some(MIME_PDF),
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some(MIME_JPEG),
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(MIME_PNG),
        // WEBP: "RIFF" <size> "WEBP"
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(MIME_WEBP),
        _ => None,
    };

    match sniffed {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Sanitize a filename: strip directory components and null bytes, cap length.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}
