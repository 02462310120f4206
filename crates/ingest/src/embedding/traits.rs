use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider returned no embeddings")]
    EmptyResponse,

    #[error("Embedding provider not configured: {0}")]
    NotConfigured(String),
}

impl EmbeddingError {
    /// Rate limits, server errors, and transport failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Trait for embedding backends (OpenAI, Ollama, etc.)
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Model identifier, recorded against each namespace so that a model
    /// change is detectable before vectors from different spaces mix.
    fn model_id(&self) -> &str;
}

/// Call `embed_batch` with exponential backoff (1s, 2s, 4s, ...) on
/// transient failures. Non-transient errors fail immediately.
pub async fn embed_with_retry(
    embedder: &dyn Embedder,
    texts: &[&str],
    max_retries: u32,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut attempt = 0;
    loop {
        match embedder.embed_batch(texts).await {
            Ok(embeddings) => return Ok(embeddings),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(
                    "Embedding attempt {} failed ({}), retrying in {:?}",
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyEmbedder {
        calls: AtomicUsize,
        failures: usize,
        transient: bool,
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                if self.transient {
                    return Err(EmbeddingError::Api {
                        status: 429,
                        body: "rate limited".to_string(),
                    });
                }
                return Err(EmbeddingError::Api {
                    status: 400,
                    body: "bad request".to_string(),
                });
            }
            Ok(texts.iter().map(|_| vec![0.5, 0.5]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_id(&self) -> &str {
            "flaky-test-model"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_until_success() {
        let embedder = FlakyEmbedder {
            calls: AtomicUsize::new(0),
            failures: 2,
            transient: true,
        };
        let result = embed_with_retry(&embedder, &["a"], 3).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let embedder = FlakyEmbedder {
            calls: AtomicUsize::new(0),
            failures: 10,
            transient: true,
        };
        let err = embed_with_retry(&embedder, &["a"], 2).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_fail_immediately() {
        let embedder = FlakyEmbedder {
            calls: AtomicUsize::new(0),
            failures: 10,
            transient: false,
        };
        let err = embed_with_retry(&embedder, &["a"], 5).await.unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn transient_classification() {
        let rate_limited = EmbeddingError::Api {
            status: 429,
            body: String::new(),
        };
        let server_error = EmbeddingError::Api {
            status: 503,
            body: String::new(),
        };
        let client_error = EmbeddingError::Api {
            status: 404,
            body: String::new(),
        };
        assert!(rate_limited.is_transient());
        assert!(server_error.is_transient());
        assert!(!client_error.is_transient());
        assert!(!EmbeddingError::NotConfigured("x".to_string()).is_transient());
    }
}
