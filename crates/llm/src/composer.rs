//! Prompt assembly and response normalization for grounded answering.

use tracing::debug;

use folio_core::config::LlmConfig;

use crate::provider::{complete_with_retry, LlmError, LlmProvider, Message, Role};
use crate::providers::create_provider;

/// Sentinel emitted when the retrieved context does not contain the answer.
pub const DATA_NOT_AVAILABLE: &str = "Data Not Available";

/// Deterministic decoding: the same context and question yield the same answer.
const TEMPERATURE: f32 = 0.0;

const ANSWER_SYSTEM_PROMPT: &str = "You are an AI assistant that answers questions based solely \
    on the provided context. If the answer is not in the context, reply exactly \
    \"Data Not Available\".";

/// Outcome of grounded answering. Availability is carried structurally so
/// downstream code never compares answer strings against the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The model answered from the supplied context.
    Grounded(String),
    /// The context did not contain the answer.
    NotAvailable,
}

impl Answer {
    /// Wire form: the grounded text, or the sentinel.
    pub fn into_text(self) -> String {
        match self {
            Answer::Grounded(text) => text,
            Answer::NotAvailable => DATA_NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Answer::Grounded(_))
    }
}

/// Builds grounded prompts and maps raw model output into [`Answer`] values.
/// Holds one provider per configured model: answering and summarization can
/// run on different models.
pub struct Composer {
    answer_provider: Box<dyn LlmProvider>,
    summary_provider: Box<dyn LlmProvider>,
    max_tokens: u32,
    max_retries: u32,
}

impl Composer {
    pub fn new(
        answer_provider: Box<dyn LlmProvider>,
        summary_provider: Box<dyn LlmProvider>,
        max_tokens: u32,
        max_retries: u32,
    ) -> Self {
        Self {
            answer_provider,
            summary_provider,
            max_tokens,
            max_retries,
        }
    }

    /// Build from config, creating one provider per configured model.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let answer_provider = create_provider(config, &config.answer_model)?;
        let summary_provider = create_provider(config, &config.summary_model)?;
        Ok(Self::new(
            answer_provider,
            summary_provider,
            config.max_tokens,
            config.max_retries,
        ))
    }

    /// Answer a question strictly from the supplied context.
    pub async fn answer(&self, context: &str, question: &str) -> Result<Answer, LlmError> {
        let messages = vec![
            Message {
                role: Role::System,
                content: ANSWER_SYSTEM_PROMPT.to_string(),
            },
            Message {
                role: Role::User,
                content: answer_prompt(context, question),
            },
        ];

        let response = complete_with_retry(
            self.answer_provider.as_ref(),
            messages,
            TEMPERATURE,
            self.max_tokens,
            self.max_retries,
        )
        .await?;

        debug!("Answer response: {}", response);
        Ok(normalize_answer(&response))
    }

    /// Summarize a document's full text.
    pub async fn summarize(&self, text: &str) -> Result<String, LlmError> {
        let messages = vec![Message {
            role: Role::User,
            content: summary_prompt(text),
        }];

        let response = complete_with_retry(
            self.summary_provider.as_ref(),
            messages,
            TEMPERATURE,
            self.max_tokens,
            self.max_retries,
        )
        .await?;

        Ok(response.trim().to_string())
    }
}

fn answer_prompt(context: &str, question: &str) -> String {
    format!("Context:\n\"\"\"\n{context}\n\"\"\"\n\nQuestion:\n{question}\n\nAnswer:")
}

fn summary_prompt(text: &str) -> String {
    format!("Summarize the following text:\n\n{text}\n\nSummary:")
}

/// A blank response means the model had nothing to say; the sentinel (with
/// tolerated case and trailing-period drift) means the context had no answer.
/// Everything else is a grounded answer.
fn normalize_answer(response: &str) -> Answer {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Answer::NotAvailable;
    }
    let stripped = trimmed.trim_end_matches('.').trim_end();
    if stripped.eq_ignore_ascii_case(DATA_NOT_AVAILABLE) {
        return Answer::NotAvailable;
    }
    Answer::Grounded(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FixedProvider {
        response: &'static str,
        seen: Arc<Mutex<Vec<Message>>>,
    }

    impl FixedProvider {
        fn new(response: &'static str) -> Self {
            Self {
                response,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        async fn complete(
            &self,
            messages: Vec<Message>,
            temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            assert_eq!(temperature, 0.0, "composer must request deterministic decoding");
            *self.seen.lock().unwrap() = messages;
            Ok(self.response.to_string())
        }
    }

    fn composer(answer: &'static str, summary: &'static str) -> Composer {
        Composer::new(
            Box::new(FixedProvider::new(answer)),
            Box::new(FixedProvider::new(summary)),
            512,
            0,
        )
    }

    #[test]
    fn normalize_maps_blank_and_sentinel_to_not_available() {
        assert_eq!(normalize_answer(""), Answer::NotAvailable);
        assert_eq!(normalize_answer("   \n"), Answer::NotAvailable);
        assert_eq!(normalize_answer("Data Not Available"), Answer::NotAvailable);
        assert_eq!(normalize_answer("data not available."), Answer::NotAvailable);
        assert_eq!(
            normalize_answer("  Data Not Available  "),
            Answer::NotAvailable
        );
    }

    #[test]
    fn normalize_keeps_grounded_answers_verbatim() {
        assert_eq!(
            normalize_answer("The warranty lasts two years."),
            Answer::Grounded("The warranty lasts two years.".to_string())
        );
        // "Data" alone is a real answer, not the sentinel.
        assert_eq!(
            normalize_answer("Data"),
            Answer::Grounded("Data".to_string())
        );
    }

    #[test]
    fn answer_wire_form_uses_the_sentinel() {
        assert_eq!(Answer::NotAvailable.into_text(), DATA_NOT_AVAILABLE);
        assert_eq!(Answer::Grounded("42".to_string()).into_text(), "42");
        assert!(!Answer::NotAvailable.is_available());
        assert!(Answer::Grounded("42".to_string()).is_available());
    }

    #[tokio::test]
    async fn grounded_answer_passes_through() {
        let composer = composer("Paris.", "unused");
        let answer = composer
            .answer("France's capital is Paris.", "What is the capital?")
            .await
            .unwrap();
        assert_eq!(answer, Answer::Grounded("Paris.".to_string()));
    }

    #[tokio::test]
    async fn answer_messages_carry_context_question_and_sentinel_instruction() {
        let provider = FixedProvider::new("ok");
        let seen = provider.seen.clone();
        let composer = Composer::new(
            Box::new(provider),
            Box::new(FixedProvider::new("unused")),
            512,
            0,
        );
        composer.answer("ctx-text-here", "the-question").await.unwrap();

        let messages = seen.lock().unwrap().clone();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0].role, Role::System));
        assert!(messages[0].content.contains(DATA_NOT_AVAILABLE));
        assert!(messages[1].content.contains("ctx-text-here"));
        assert!(messages[1].content.contains("the-question"));
        assert!(messages[1].content.starts_with("Context:"));
        assert!(messages[1].content.trim_end().ends_with("Answer:"));
    }

    #[tokio::test]
    async fn summarize_uses_the_summary_provider() {
        let composer = composer("from-answer-model", "A short summary.");
        let summary = composer.summarize("Some document text.").await.unwrap();
        assert_eq!(summary, "A short summary.");
    }

    #[tokio::test]
    async fn sentinel_response_becomes_not_available() {
        let composer = composer("Data Not Available", "unused");
        let answer = composer.answer("context", "question").await.unwrap();
        assert_eq!(answer, Answer::NotAvailable);
    }
}
