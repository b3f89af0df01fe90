use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Mediflow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analysis service used when MEDIFLOW_API_URL is not set.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Analysis of a scanned report can take a while on the service side.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

pub const ENV_API_URL: &str = "MEDIFLOW_API_URL";
pub const ENV_STORE_URL: &str = "MEDIFLOW_STORE_URL";
pub const ENV_STORE_KEY: &str = "MEDIFLOW_STORE_KEY";
pub const ENV_HTTP_TIMEOUT: &str = "MEDIFLOW_HTTP_TIMEOUT_SECS";

/// Filter used when RUST_LOG is absent.
pub fn default_log_filter() -> &'static str {
    "mediflow=info"
}

/// Get the application data directory
/// ~/Mediflow/ on all platforms
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// SQLite file holding the per-user local cache.
pub fn local_db_path() -> PathBuf {
    app_data_dir().join("mediflow.db")
}

/// Credentials for the remote record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    pub url: String,
    pub anon_key: String,
}

/// Runtime configuration resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub remote_store: Option<RemoteStoreConfig>,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            remote_store: None,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary key lookup.
    ///
    /// The remote store is only enabled when both the URL and the key are
    /// present and the URL looks like an http(s) endpoint. Anything else
    /// selects the local backend.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = non_empty(ENV_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let remote_store = match (non_empty(ENV_STORE_URL), non_empty(ENV_STORE_KEY)) {
            (Some(url), Some(anon_key)) if url.starts_with("http") => Some(RemoteStoreConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            (Some(url), Some(_)) => {
                tracing::warn!(url = %url, "Remote store URL is not http(s), using local storage");
                None
            }
            _ => None,
        };

        let http_timeout_secs = non_empty(ENV_HTTP_TIMEOUT)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            api_base_url,
            remote_store,
            http_timeout_secs,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.api_base_url)
    }
}

/// Concrete URLs of the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub analyze: String,
    pub consult: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            analyze: format!("{base}/api/reports/analyze"),
            consult: format!("{base}/api/physio/consult"),
        }
    }
}
