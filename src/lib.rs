pub mod config;
pub mod core_state;
pub mod dates;
pub mod db;
pub mod health; // Range mapping, organ resolution, health score, dashboard
pub mod identity;
pub mod models;
pub mod physio; // Plan consultation, session tracker, consistency calendar
pub mod pipeline; // Analysis client + batch ingestion
pub mod store; // Document store (remote / local) + per-user datasets

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("{} core starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_twice_does_not_panic() {
        init_tracing();
        init_tracing();
    }
}
