pub mod anthropic;
pub mod ollama;
pub mod openai;

use folio_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
///
/// The model is passed separately because answering and summarization run
/// on independently configured models behind the same provider.
pub fn create_provider(config: &LlmConfig, model: &str) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                model.to_string(),
                base_url.to_string(),
                config.timeout_secs,
            )))
        }
        "anthropic" | "claude" => {
            let api_key = config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(anthropic::AnthropicProvider::new(
                api_key.clone(),
                model.to_string(),
                config.timeout_secs,
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            config.ollama_url.clone(),
            model.to_string(),
            config.timeout_secs,
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
