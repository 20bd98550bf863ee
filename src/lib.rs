pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod storage;
pub mod workflow;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging. `RUST_LOG` overrides the built-in filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
