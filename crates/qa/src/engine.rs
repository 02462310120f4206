//! Question-answering orchestration: ingest, ask, purge.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use folio_index::{DocumentSummary, EmbeddingIndex, IndexError, PopulateOutcome, SummaryStore};
use folio_ingest::{concat_text, extract_pages, segment_pages, ExtractionError, Page};
use folio_llm::{Answer, Composer, LlmError};

#[derive(Debug, Error)]
pub enum QaError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("language model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("index operation failed: {0}")]
    Index(#[from] IndexError),
}

/// What an ingest produced.
#[derive(Debug, Clone)]
pub struct IngestReceipt {
    pub document_id: Uuid,
    pub summary: String,
    pub page_count: usize,
    pub chunk_count: usize,
}

/// Ties the pipeline together: segmentation, the per-document embedding
/// index, the summary store used for routing, and the answer composer.
/// Built once from injected parts and shared behind an `Arc`.
pub struct QaEngine {
    index: EmbeddingIndex,
    summaries: SummaryStore,
    composer: Composer,
    max_chunk_tokens: usize,
    top_k: usize,
}

impl QaEngine {
    pub fn new(
        index: EmbeddingIndex,
        summaries: SummaryStore,
        composer: Composer,
        max_chunk_tokens: usize,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            summaries,
            composer,
            max_chunk_tokens,
            top_k,
        }
    }

    /// Ingest a PDF: extract pages, chunk, summarize, and index under a
    /// freshly allocated document id.
    pub async fn ingest(&self, pdf_bytes: &[u8]) -> Result<IngestReceipt, QaError> {
        let pages = extract_pages(pdf_bytes)?;
        self.ingest_pages(pages).await
    }

    /// Ingest already-extracted pages. The summary is recorded before the
    /// index is populated; if population fails the summary record and the
    /// half-built namespace are removed again, so a failed ingest leaves
    /// no trace.
    pub async fn ingest_pages(&self, pages: Vec<Page>) -> Result<IngestReceipt, QaError> {
        let document_id = Uuid::new_v4();
        let chunks = segment_pages(&pages, self.max_chunk_tokens);
        info!(
            "Ingesting document {}: {} pages, {} chunks",
            document_id,
            pages.len(),
            chunks.len()
        );

        let full_text = concat_text(&pages);
        let summary = if full_text.trim().is_empty() {
            // Nothing to summarize; skip the model call entirely.
            String::new()
        } else {
            self.composer.summarize(&full_text).await?
        };

        self.summaries.record(document_id, &summary).await?;

        let outcome = match self.index.populate(document_id, &chunks).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.rollback_ingest(document_id).await;
                return Err(e.into());
            }
        };
        let chunk_count = match outcome {
            PopulateOutcome::Populated(n) => n,
            PopulateOutcome::AlreadyPopulated => self.index.chunk_count(document_id).await? as usize,
        };

        Ok(IngestReceipt {
            document_id,
            summary,
            page_count: pages.len(),
            chunk_count,
        })
    }

    /// Compensating deletes for a failed ingest. Best effort: the original
    /// error is what the caller needs to see.
    async fn rollback_ingest(&self, document_id: Uuid) {
        warn!("Ingest of {} failed, rolling back", document_id);
        if let Err(e) = self.summaries.remove(document_id).await {
            warn!("Rollback: could not remove summary for {}: {}", document_id, e);
        }
        if let Err(e) = self.index.drop_namespace(document_id).await {
            warn!("Rollback: could not drop namespace for {}: {}", document_id, e);
        }
    }

    /// Answer a batch of questions against one document, using the
    /// configured number of context chunks per question.
    pub async fn ask(
        &self,
        questions: &[String],
        document_id: Option<Uuid>,
    ) -> Result<BTreeMap<String, String>, QaError> {
        self.ask_with_top_k(questions, document_id, self.top_k).await
    }

    /// Like [`ask`](Self::ask) with an explicit per-request chunk budget.
    ///
    /// The document is resolved exactly once: the supplied id, or the best
    /// summary match for the first question. Only after resolution do the
    /// per-question retrievals start, and those run concurrently. A document
    /// that resolves to nothing (or to an empty namespace) answers every
    /// question with the not-available sentinel rather than failing; a
    /// provider or store error fails the whole batch.
    pub async fn ask_with_top_k(
        &self,
        questions: &[String],
        document_id: Option<Uuid>,
        top_k: usize,
    ) -> Result<BTreeMap<String, String>, QaError> {
        let Some(first) = questions.first() else {
            return Ok(BTreeMap::new());
        };

        let resolved = match document_id {
            Some(id) => Some(id),
            None => self.summaries.find_best(first).await?,
        };
        let Some(id) = resolved else {
            info!("No document resolved for batch of {} questions", questions.len());
            return Ok(all_not_available(questions));
        };

        if self.index.chunk_count(id).await? == 0 {
            info!("Document {} has no indexed chunks", id);
            return Ok(all_not_available(questions));
        }

        // Map semantics: duplicate questions are answered once.
        let unique: BTreeSet<&str> = questions.iter().map(String::as_str).collect();
        let answers = futures::future::try_join_all(
            unique
                .iter()
                .map(|question| self.answer_one(id, question, top_k)),
        )
        .await?;

        Ok(answers
            .into_iter()
            .map(|(question, answer)| (question, answer.into_text()))
            .collect())
    }

    async fn answer_one(
        &self,
        document_id: Uuid,
        question: &str,
        top_k: usize,
    ) -> Result<(String, Answer), QaError> {
        let hits = self.index.query(document_id, question, top_k).await?;
        if hits.is_empty() {
            return Ok((question.to_string(), Answer::NotAvailable));
        }

        // Highest-similarity chunk first, same order the index returned.
        let context = hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let answer = self.composer.answer(&context, question).await?;
        Ok((question.to_string(), answer))
    }

    /// Remove a document's summary and embedding namespace. Returns false
    /// (touching nothing) when the document was never ingested.
    pub async fn purge(&self, document_id: Uuid) -> Result<bool, QaError> {
        if !self.summaries.remove(document_id).await? {
            return Ok(false);
        }
        self.index.drop_namespace(document_id).await?;
        info!("Purged document {}", document_id);
        Ok(true)
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, QaError> {
        Ok(self.summaries.list().await?)
    }
}

fn all_not_available(questions: &[String]) -> BTreeMap<String, String> {
    questions
        .iter()
        .map(|q| (q.clone(), Answer::NotAvailable.into_text()))
        .collect()
}
