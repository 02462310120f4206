pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use folio_core::config::EmbeddingConfig;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{embed_with_retry, Embedder, EmbeddingError};

/// Create the appropriate embedding backend based on config.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| EmbeddingError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key.clone(),
                config.model.clone(),
                config.openai_base_url.clone(),
                config.dimensions as usize,
                config.timeout_secs,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            config.ollama_url.clone(),
            config.model.clone(),
            config.dimensions as usize,
            config.timeout_secs,
        ))),
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: '{}'",
            other
        ))),
    }
}
