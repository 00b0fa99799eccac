//! Logging setup.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "movies_api=info,api_server=info,preflight=info,tower_http=info";

/// Installs a compact fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
