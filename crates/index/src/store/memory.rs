//! In-memory backend with brute-force cosine search. Backs the test suite
//! and small single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChunkRecord, DocumentSummary, IndexError, ScoredChunk, SummaryMatch, VectorStore};

struct Namespace {
    embedding_model: String,
    chunks: Vec<ChunkRecord>,
}

struct StoredSummary {
    summary: String,
    embedding: Vec<f32>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryStore {
    namespaces: RwLock<HashMap<Uuid, Namespace>>,
    summaries: RwLock<HashMap<Uuid, StoredSummary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity; zero for empty, mismatched, or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f64::EPSILON {
        return 0.0;
    }
    dot / denom
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn claim_namespace(
        &self,
        document_id: Uuid,
        embedding_model: &str,
    ) -> Result<bool, IndexError> {
        let mut namespaces = self.namespaces.write().await;
        if namespaces.contains_key(&document_id) {
            return Ok(false);
        }
        namespaces.insert(
            document_id,
            Namespace {
                embedding_model: embedding_model.to_string(),
                chunks: Vec::new(),
            },
        );
        Ok(true)
    }

    async fn namespace_model(&self, document_id: Uuid) -> Result<Option<String>, IndexError> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .get(&document_id)
            .map(|ns| ns.embedding_model.clone()))
    }

    async fn insert_chunks(
        &self,
        document_id: Uuid,
        chunks: &[ChunkRecord],
    ) -> Result<(), IndexError> {
        let mut namespaces = self.namespaces.write().await;
        if let Some(ns) = namespaces.get_mut(&document_id) {
            ns.chunks.extend_from_slice(chunks);
        }
        Ok(())
    }

    async fn search_chunks(
        &self,
        document_id: Uuid,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, IndexError> {
        let namespaces = self.namespaces.read().await;
        let Some(ns) = namespaces.get(&document_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredChunk> = ns
            .chunks
            .iter()
            .map(|c| ScoredChunk {
                chunk_index: c.chunk_index,
                text: c.text.clone(),
                page_number: c.page_number,
                score: cosine_similarity(&c.embedding, query),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn chunk_count(&self, document_id: Uuid) -> Result<u64, IndexError> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .get(&document_id)
            .map_or(0, |ns| ns.chunks.len() as u64))
    }

    async fn drop_namespace(&self, document_id: Uuid) -> Result<bool, IndexError> {
        let mut namespaces = self.namespaces.write().await;
        Ok(namespaces.remove(&document_id).is_some())
    }

    async fn upsert_summary(
        &self,
        document_id: Uuid,
        summary: &str,
        embedding: &[f32],
    ) -> Result<(), IndexError> {
        let mut summaries = self.summaries.write().await;
        summaries
            .entry(document_id)
            .and_modify(|s| {
                s.summary = summary.to_string();
                s.embedding = embedding.to_vec();
            })
            .or_insert_with(|| StoredSummary {
                summary: summary.to_string(),
                embedding: embedding.to_vec(),
                created_at: Utc::now(),
            });
        Ok(())
    }

    async fn nearest_summaries(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SummaryMatch>, IndexError> {
        let summaries = self.summaries.read().await;
        let mut matches: Vec<SummaryMatch> = summaries
            .iter()
            .map(|(id, s)| SummaryMatch {
                document_id: *id,
                score: cosine_similarity(&s.embedding, query),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn delete_summary(&self, document_id: Uuid) -> Result<bool, IndexError> {
        let mut summaries = self.summaries.write().await;
        Ok(summaries.remove(&document_id).is_some())
    }

    async fn list_summaries(&self) -> Result<Vec<DocumentSummary>, IndexError> {
        let summaries = self.summaries.read().await;
        let mut list: Vec<DocumentSummary> = summaries
            .iter()
            .map(|(id, s)| DocumentSummary {
                document_id: *id,
                summary: s.summary.clone(),
                created_at: s.created_at,
            })
            .collect();
        list.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(a.document_id.cmp(&b.document_id))
        });
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn cosine_of_identical_direction_is_one() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![2.0, 4.0, 6.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-9);
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn second_claim_loses() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(store.claim_namespace(id, "model-a").await.unwrap());
        assert!(!store.claim_namespace(id, "model-a").await.unwrap());
        assert_eq!(
            store.namespace_model(id).await.unwrap(),
            Some("model-a".to_string())
        );
    }

    #[tokio::test]
    async fn concurrent_claims_have_exactly_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let id = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.claim_namespace(id, "model-a").await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.claim_namespace(id, "m").await.unwrap();
        store
            .insert_chunks(
                id,
                &[
                    ChunkRecord {
                        chunk_index: 0,
                        text: "east".to_string(),
                        page_number: 1,
                        embedding: vec![1.0, 0.0],
                    },
                    ChunkRecord {
                        chunk_index: 1,
                        text: "north".to_string(),
                        page_number: 1,
                        embedding: vec![0.0, 1.0],
                    },
                    ChunkRecord {
                        chunk_index: 2,
                        text: "northeast".to_string(),
                        page_number: 2,
                        embedding: vec![1.0, 1.0],
                    },
                ],
            )
            .await
            .unwrap();

        let hits = store.search_chunks(id, &[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "east");
        assert_eq!(hits[1].text, "northeast");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn dropping_unknown_namespace_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.drop_namespace(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn drop_removes_chunks_and_count() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.claim_namespace(id, "m").await.unwrap();
        store
            .insert_chunks(
                id,
                &[ChunkRecord {
                    chunk_index: 0,
                    text: "x".to_string(),
                    page_number: 1,
                    embedding: vec![1.0],
                }],
            )
            .await
            .unwrap();
        assert_eq!(store.chunk_count(id).await.unwrap(), 1);

        assert!(store.drop_namespace(id).await.unwrap());
        assert_eq!(store.chunk_count(id).await.unwrap(), 0);
        assert!(store.namespace_model(id).await.unwrap().is_none());
        assert!(store.search_chunks(id, &[1.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_upsert_overwrites_in_place() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.upsert_summary(id, "first", &[1.0, 0.0]).await.unwrap();
        store.upsert_summary(id, "second", &[0.0, 1.0]).await.unwrap();

        let list = store.list_summaries().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].summary, "second");

        let matches = store.nearest_summaries(&[0.0, 1.0], 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert!((matches[0].score - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn delete_summary_reports_presence() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert!(!store.delete_summary(id).await.unwrap());
        store.upsert_summary(id, "s", &[1.0]).await.unwrap();
        assert!(store.delete_summary(id).await.unwrap());
        assert!(store.list_summaries().await.unwrap().is_empty());
    }
}
