//! Per-document chunk index: populate once, query top-k.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use folio_ingest::{embed_with_retry, Chunk, Embedder, EmbeddingError};

use crate::store::{ChunkRecord, IndexError, VectorStore};

/// Result of a populate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateOutcome {
    /// The namespace was created and this many chunks were indexed.
    Populated(usize),
    /// A namespace for this document already existed; nothing was written.
    AlreadyPopulated,
}

/// A chunk retrieved for answering.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub page_number: usize,
    pub score: f64,
}

/// Embeds chunks into per-document namespaces and serves top-k retrieval.
pub struct EmbeddingIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    max_retries: u32,
}

impl EmbeddingIndex {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
        max_retries: u32,
    ) -> Self {
        Self {
            store,
            embedder,
            batch_size: batch_size.max(1),
            max_retries,
        }
    }

    /// Embed and index a document's chunks, claiming the namespace first.
    /// Idempotent: a document whose namespace exists is left untouched.
    pub async fn populate(
        &self,
        document_id: Uuid,
        chunks: &[Chunk],
    ) -> Result<PopulateOutcome, IndexError> {
        let claimed = self
            .store
            .claim_namespace(document_id, self.embedder.model_id())
            .await?;
        if !claimed {
            debug!("Namespace for {} already populated, skipping", document_id);
            return Ok(PopulateOutcome::AlreadyPopulated);
        }

        let mut indexed = 0;
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings =
                embed_with_retry(self.embedder.as_ref(), &texts, self.max_retries).await?;

            let records: Vec<ChunkRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| ChunkRecord {
                    chunk_index: chunk.index,
                    text: chunk.text.clone(),
                    page_number: chunk.page_number,
                    embedding,
                })
                .collect();

            self.store.insert_chunks(document_id, &records).await?;
            indexed += records.len();
        }

        info!("Indexed {} chunks for document {}", indexed, document_id);
        Ok(PopulateOutcome::Populated(indexed))
    }

    /// Top-k chunks for a question within one document's namespace, best
    /// first. An absent or empty namespace yields an empty list. A namespace
    /// built with a different embedding model is an error: its vectors do
    /// not live in the same space as the query.
    pub async fn query(
        &self,
        document_id: Uuid,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, IndexError> {
        let Some(stored) = self.store.namespace_model(document_id).await? else {
            return Ok(Vec::new());
        };
        if self.store.chunk_count(document_id).await? == 0 {
            return Ok(Vec::new());
        }

        let configured = self.embedder.model_id();
        if stored != configured {
            return Err(IndexError::ModelMismatch {
                document_id,
                stored,
                configured: configured.to_string(),
            });
        }

        let query = embed_with_retry(self.embedder.as_ref(), &[question], self.max_retries)
            .await?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?;

        let hits = self.store.search_chunks(document_id, &query, top_k).await?;
        Ok(hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                text: hit.text,
                page_number: hit.page_number,
                score: hit.score,
            })
            .collect())
    }

    pub async fn chunk_count(&self, document_id: Uuid) -> Result<u64, IndexError> {
        self.store.chunk_count(document_id).await
    }

    /// Remove a document's namespace and all its vectors.
    pub async fn drop_namespace(&self, document_id: Uuid) -> Result<bool, IndexError> {
        self.store.drop_namespace(document_id).await
    }
}
