pub mod index;
pub mod store;
pub mod summary;

pub use index::{EmbeddingIndex, PopulateOutcome, RetrievedChunk};
pub use store::memory::MemoryStore;
pub use store::pg::PgStore;
pub use store::{ChunkRecord, DocumentSummary, IndexError, ScoredChunk, SummaryMatch, VectorStore};
pub use summary::SummaryStore;
