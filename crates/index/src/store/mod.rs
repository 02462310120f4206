//! Storage backends for chunk vectors and document summaries.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use folio_ingest::EmbeddingError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document {document_id} was indexed with embedding model '{stored}' but '{configured}' is configured")]
    ModelMismatch {
        document_id: Uuid,
        stored: String,
        configured: String,
    },
}

/// A chunk ready for insertion: text plus its embedding.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub chunk_index: usize,
    pub text: String,
    pub page_number: usize,
    pub embedding: Vec<f32>,
}

/// A chunk returned from similarity search.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk_index: usize,
    pub text: String,
    pub page_number: usize,
    /// Cosine similarity, higher is closer.
    pub score: f64,
}

/// A summary hit from the routing search.
#[derive(Debug, Clone)]
pub struct SummaryMatch {
    pub document_id: Uuid,
    pub score: f64,
}

/// The single summary a document owns.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub document_id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// Vector persistence seam. [`pg::PgStore`] is the production backend,
/// [`memory::MemoryStore`] backs tests.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the namespace for a document if absent, recording which
    /// embedding model its vectors come from. Returns false when the
    /// namespace already exists. The claim is atomic: exactly one of
    /// two concurrent callers wins.
    async fn claim_namespace(
        &self,
        document_id: Uuid,
        embedding_model: &str,
    ) -> Result<bool, IndexError>;

    /// The embedding model a namespace was claimed with, if it exists.
    async fn namespace_model(&self, document_id: Uuid) -> Result<Option<String>, IndexError>;

    async fn insert_chunks(
        &self,
        document_id: Uuid,
        chunks: &[ChunkRecord],
    ) -> Result<(), IndexError>;

    /// Nearest chunks within one document's namespace, best first.
    async fn search_chunks(
        &self,
        document_id: Uuid,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError>;

    async fn chunk_count(&self, document_id: Uuid) -> Result<u64, IndexError>;

    /// Remove a namespace and its chunks. Returns false if it never existed.
    async fn drop_namespace(&self, document_id: Uuid) -> Result<bool, IndexError>;

    /// Insert or overwrite the single summary a document owns.
    async fn upsert_summary(
        &self,
        document_id: Uuid,
        summary: &str,
        embedding: &[f32],
    ) -> Result<(), IndexError>;

    /// Nearest summaries across all documents, best first.
    async fn nearest_summaries(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SummaryMatch>, IndexError>;

    /// Remove a document's summary. Returns false if none existed.
    async fn delete_summary(&self, document_id: Uuid) -> Result<bool, IndexError>;

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>, IndexError>;
}
