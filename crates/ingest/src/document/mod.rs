mod pdf;
pub mod segment;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
}

/// A page of extracted text.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number in the source document.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
}

/// Extract text from PDF bytes, one entry per page that carries text.
///
/// Pages without text are dropped while the surviving pages keep their
/// original numbering. An empty result means the document parsed fine but
/// contains no extractable text (scanned or image-only PDF).
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<Page>, ExtractionError> {
    pdf::extract_pdf(bytes)
}

/// All page text concatenated, used for whole-document summarization.
pub fn concat_text(pages: &[Page]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
