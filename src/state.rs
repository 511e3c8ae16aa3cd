// Application state module
// Everything a handler needs, injected explicitly rather than reached for
// through globals: configuration, the database pool, the CSRF signer.

use std::sync::atomic::AtomicBool;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::security::CsrfSigner;

/// Shared application state, one instance per process behind an `Arc`
pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    pub csrf: CsrfSigner,
    /// Access-log flag cached for lock-free reads on the hot path
    pub cached_access_log: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let csrf = CsrfSigner::new(&config.security.csrf_key);
        let cached_access_log = AtomicBool::new(config.logging.access_log);
        Self {
            config,
            db,
            csrf,
            cached_access_log,
        }
    }
}
