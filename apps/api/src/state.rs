use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Text-generation backend. Gemini in production, a stub in tests.
    pub generator: Arc<dyn TextGenerator>,
    pub config: Config,
}
