//! One summary per document, searchable for question routing.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use folio_ingest::{embed_with_retry, Embedder, EmbeddingError};

use crate::store::{DocumentSummary, IndexError, VectorStore};

pub struct SummaryStore {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    max_retries: u32,
}

impl SummaryStore {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, max_retries: u32) -> Self {
        Self {
            store,
            embedder,
            max_retries,
        }
    }

    /// Record (or replace) the summary a document owns.
    ///
    /// An empty summary is stored with a zero vector: the document stays
    /// listable and removable, but routing search never ranks it above a
    /// real match.
    pub async fn record(&self, document_id: Uuid, summary: &str) -> Result<(), IndexError> {
        let embedding = if summary.trim().is_empty() {
            vec![0.0; self.embedder.dimensions()]
        } else {
            embed_with_retry(self.embedder.as_ref(), &[summary], self.max_retries)
                .await?
                .into_iter()
                .next()
                .ok_or(EmbeddingError::EmptyResponse)?
        };
        self.store
            .upsert_summary(document_id, summary, &embedding)
            .await
    }

    /// Best-matching document for a question, or None when nothing is stored.
    pub async fn find_best(&self, question: &str) -> Result<Option<Uuid>, IndexError> {
        let query = embed_with_retry(self.embedder.as_ref(), &[question], self.max_retries)
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?;

        let matches = self.store.nearest_summaries(&query, 1).await?;
        let best = matches.into_iter().next();
        if let Some(m) = &best {
            debug!(
                "Routed question to document {} (score {:.3})",
                m.document_id, m.score
            );
        }
        Ok(best.map(|m| m.document_id))
    }

    /// Remove a document's summary. Returns false when the document is unknown.
    pub async fn remove(&self, document_id: Uuid) -> Result<bool, IndexError> {
        self.store.delete_summary(document_id).await
    }

    pub async fn list(&self) -> Result<Vec<DocumentSummary>, IndexError> {
        self.store.list_summaries().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::store::memory::MemoryStore;

    /// Deterministic toy embedding: letter histogram folded into 8 dims.
    fn encode(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; 8];
        for b in text.to_ascii_lowercase().bytes() {
            if b.is_ascii_lowercase() {
                v[usize::from(b - b'a') % 8] += 1.0;
            }
        }
        v
    }

    #[derive(Default)]
    struct FakeEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| encode(t)).collect())
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn model_id(&self) -> &str {
            "fake-model"
        }
    }

    fn summaries() -> (SummaryStore, Arc<FakeEmbedder>) {
        let embedder = Arc::new(FakeEmbedder::default());
        let store = SummaryStore::new(Arc::new(MemoryStore::new()), embedder.clone(), 0);
        (store, embedder)
    }

    #[tokio::test]
    async fn routing_prefers_the_similar_summary() {
        let (store, _) = summaries();
        let cooking = Uuid::new_v4();
        let astronomy = Uuid::new_v4();

        store
            .record(cooking, "aaaa aaaa aaaa aaaa")
            .await
            .unwrap();
        store
            .record(astronomy, "zzzz zzzz zzzz zzzz")
            .await
            .unwrap();

        let best = store.find_best("aaaa aaaa").await.unwrap();
        assert_eq!(best, Some(cooking));
    }

    #[tokio::test]
    async fn empty_store_routes_nowhere() {
        let (store, _) = summaries();
        assert_eq!(store.find_best("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_summary_is_stored_without_an_embed_call() {
        let (store, embedder) = summaries();
        let id = Uuid::new_v4();
        store.record(id, "").await.unwrap();

        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].summary, "");
        assert!(store.remove(id).await.unwrap());
    }

    #[tokio::test]
    async fn empty_summary_never_outranks_a_real_one() {
        let (store, _) = summaries();
        let blank = Uuid::new_v4();
        let real = Uuid::new_v4();

        store.record(blank, "").await.unwrap();
        store.record(real, "aaaa aaaa").await.unwrap();

        let best = store.find_best("aaaa").await.unwrap();
        assert_eq!(best, Some(real));
    }

    #[tokio::test]
    async fn remove_reports_unknown_documents() {
        let (store, _) = summaries();
        assert!(!store.remove(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn list_returns_every_recorded_summary() {
        let (store, _) = summaries();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.record(a, "first document summary").await.unwrap();
        store.record(b, "second document summary").await.unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        let ids: Vec<Uuid> = list.iter().map(|s| s.document_id).collect();
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
    }
}
