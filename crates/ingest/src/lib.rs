pub mod document;
pub mod embedding;

pub use document::segment::{count_tokens, segment_pages, Chunk};
pub use document::{concat_text, extract_pages, ExtractionError, Page};
pub use embedding::{create_embedder, embed_with_retry, Embedder, EmbeddingError};
