//! Remote record store: one `reports` row per analyzed file, scoped by the
//! signed-in user's id.

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::config::RemoteStoreConfig;
use crate::dates::format_timestamp_day;
use crate::models::metric::null_as_default;
use crate::models::{AnalysisResult, DocumentId, DocumentRecord};

const REPORTS_TABLE: &str = "reports";

/// Row as written.
#[derive(Debug, Serialize)]
pub struct NewReportRow<'a> {
    pub user_id: &'a str,
    pub file_name: &'a str,
    pub analysis_json: &'a AnalysisResult,
}

/// Row as read back; `id` and `created_at` are assigned by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteReportRow {
    pub id: DocumentId,
    #[serde(default)]
    pub user_id: Option<String>,
    pub file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analysis_json: AnalysisResult,
    pub created_at: String,
}

impl RemoteReportRow {
    pub fn into_record(self) -> DocumentRecord {
        DocumentRecord {
            id: self.id,
            name: self.file_name,
            date: format_timestamp_day(&self.created_at),
            analysis: self.analysis_json,
        }
    }
}

/// Insert-one / list-all access to the remote table.
pub trait RecordStoreClient: Send + Sync {
    fn insert_report(&self, row: &NewReportRow<'_>) -> Result<(), StoreError>;

    /// All rows of one user, newest first.
    fn list_reports(&self, user_id: &str) -> Result<Vec<RemoteReportRow>, StoreError>;
}

/// PostgREST-style HTTP client for the `reports` table.
pub struct RestRecordStore {
    table_url: String,
    anon_key: String,
    client: reqwest::blocking::Client,
}

impl RestRecordStore {
    pub fn new(config: &RemoteStoreConfig, timeout_secs: u64) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Remote(e.to_string()))?;

        Ok(Self {
            table_url: format!("{}/rest/v1/{REPORTS_TABLE}", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            client,
        })
    }

    fn authorized(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(StoreError::RemoteRejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            })
        }
    }
}

impl RecordStoreClient for RestRecordStore {
    fn insert_report(&self, row: &NewReportRow<'_>) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.post(&self.table_url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .map_err(|e| StoreError::Remote(e.to_string()))?;
        Self::check(response)?;
        Ok(())
    }

    fn list_reports(&self, user_id: &str) -> Result<Vec<RemoteReportRow>, StoreError> {
        let user_filter = format!("eq.{user_id}");
        let response = self
            .authorized(self.client.get(&self.table_url))
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .map_err(|e| StoreError::Remote(e.to_string()))?;

        Self::check(response)?
            .json::<Vec<RemoteReportRow>>()
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
