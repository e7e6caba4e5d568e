use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "fintrack=info";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Initializes the global subscriber once. `RUST_LOG` wins over `default_filter`.
/// Logs go to stderr so script output stays clean.
pub fn init_tracing_with(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
