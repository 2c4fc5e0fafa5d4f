//! Logging setup for binaries embedding the handlers.
//!
//! Filters come from `REMOTELOG_LOG` (`EnvFilter` syntax, e.g.
//! `remotelog_core=debug,info`); the default level is `info`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "REMOTELOG_LOG";

static INIT: Once = Once::new();

/// Installs a global `fmt` subscriber. Later calls are no-ops.
pub fn init_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new("info"));
        // 既に別の subscriber が入っている場合（テストなど）は何もしない
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
