//! PostgreSQL + pgvector backend.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{ChunkRecord, DocumentSummary, IndexError, ScoredChunk, SummaryMatch, VectorStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VectorStore for PgStore {
    async fn claim_namespace(
        &self,
        document_id: Uuid,
        embedding_model: &str,
    ) -> Result<bool, IndexError> {
        let result = sqlx::query(
            "INSERT INTO documents (id, embedding_model) VALUES ($1, $2) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(document_id)
        .bind(embedding_model)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn namespace_model(&self, document_id: Uuid) -> Result<Option<String>, IndexError> {
        let row = sqlx::query("SELECT embedding_model FROM documents WHERE id = $1")
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("embedding_model")))
    }

    async fn insert_chunks(
        &self,
        document_id: Uuid,
        chunks: &[ChunkRecord],
    ) -> Result<(), IndexError> {
        for chunk in chunks {
            let embedding = Vector::from(chunk.embedding.clone());
            sqlx::query(
                "INSERT INTO chunks (document_id, chunk_index, content, page_number, embedding) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(document_id)
            .bind(chunk.chunk_index as i32)
            .bind(&chunk.text)
            .bind(chunk.page_number as i32)
            .bind(&embedding)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn search_chunks(
        &self,
        document_id: Uuid,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError> {
        let embedding = Vector::from(query.to_vec());
        let rows = sqlx::query(
            "SELECT chunk_index, content, page_number, \
             1.0 - (embedding <=> $2::vector) as score \
             FROM chunks \
             WHERE document_id = $1 \
             ORDER BY embedding <=> $2::vector \
             LIMIT $3",
        )
        .bind(document_id)
        .bind(&embedding)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ScoredChunk {
                chunk_index: row.get::<i32, _>("chunk_index") as usize,
                text: row.get("content"),
                page_number: row.get::<i32, _>("page_number") as usize,
                score: row.get("score"),
            })
            .collect())
    }

    async fn chunk_count(&self, document_id: Uuid) -> Result<u64, IndexError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM chunks WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count") as u64)
    }

    async fn drop_namespace(&self, document_id: Uuid) -> Result<bool, IndexError> {
        // Chunks go with it (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_summary(
        &self,
        document_id: Uuid,
        summary: &str,
        embedding: &[f32],
    ) -> Result<(), IndexError> {
        let embedding = Vector::from(embedding.to_vec());
        sqlx::query(
            "INSERT INTO summaries (document_id, summary, embedding) VALUES ($1, $2, $3) \
             ON CONFLICT (document_id) \
             DO UPDATE SET summary = EXCLUDED.summary, embedding = EXCLUDED.embedding",
        )
        .bind(document_id)
        .bind(summary)
        .bind(&embedding)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn nearest_summaries(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SummaryMatch>, IndexError> {
        let embedding = Vector::from(query.to_vec());
        let rows = sqlx::query(
            "SELECT document_id, 1.0 - (embedding <=> $1::vector) as score \
             FROM summaries \
             ORDER BY embedding <=> $1::vector \
             LIMIT $2",
        )
        .bind(&embedding)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SummaryMatch {
                document_id: row.get("document_id"),
                score: row.get("score"),
            })
            .collect())
    }

    async fn delete_summary(&self, document_id: Uuid) -> Result<bool, IndexError> {
        let result = sqlx::query("DELETE FROM summaries WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>, IndexError> {
        let rows = sqlx::query(
            "SELECT document_id, summary, created_at FROM summaries ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DocumentSummary {
                document_id: row.get("document_id"),
                summary: row.get("summary"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
