use serde::Deserialize;

use super::{AnalysisClient, AnalysisError, ReportFile};
use crate::config::AppConfig;
use crate::models::AnalysisResult;

/// Error body of the analysis service.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Blocking client for `POST /api/reports/analyze`.
pub struct HttpAnalysisClient {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        Self::new(&config.endpoints().analyze, config.http_timeout_secs)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl AnalysisClient for HttpAnalysisClient {
    fn analyze(&self, file: &ReportFile) -> Result<AnalysisResult, AnalysisError> {
        if !file.is_supported() {
            return Err(AnalysisError::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }

        let part = reqwest::blocking::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;
        let form = reqwest::blocking::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AnalysisError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    AnalysisError::Timeout(self.timeout_secs)
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body, &file.name),
            });
        }

        response
            .json::<AnalysisResult>()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))
    }
}

/// The service's `detail` when it sent one, else a generic per-file message.
fn rejection_message(body: &str, file_name: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        });
    detail.unwrap_or_else(|| format!("Failed to analyze {file_name}"))
}
