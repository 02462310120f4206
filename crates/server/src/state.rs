use std::sync::Arc;

use folio_qa::QaEngine;

/// Shared application state, built once at startup and handed to every
/// handler behind an `Arc`.
pub struct AppState {
    pub engine: Arc<QaEngine>,
}
