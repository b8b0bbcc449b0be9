use std::sync::Arc;

use tokio::sync::Mutex;

use crate::backends::ModelBackend;
use crate::config::Config;
use crate::history::RevisionHistory;
use crate::pipeline::composer::Composer;

/// One interactive session's mutable state: the composer transcript and the
/// revision history. The service runs a single session at a time.
#[derive(Debug, Default)]
pub struct Session {
    pub composer: Composer,
    pub history: RevisionHistory,
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Production: `HttpModelClient`; tests swap in
    /// a scripted backend.
    pub backend: Arc<dyn ModelBackend>,
    /// The single active session. The mutex serializes handler access,
    /// honoring the one-in-flight-operation contract.
    pub session: Arc<Mutex<Session>>,
    pub config: Config,
}
