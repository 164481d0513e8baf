use std::sync::Arc;

use minijinja::Environment;

use crate::config::Config;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here is per-user.
#[derive(Clone)]
pub struct AppState {
    /// Gemini in production; a scripted backend in tests.
    pub backend: Arc<dyn CompletionBackend>,
    pub templates: Arc<Environment<'static>>,
    pub config: Config,
}
