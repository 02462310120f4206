//! Token-window segmentation of extracted pages.

use super::Page;

/// A chunk of page text with attribution metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 0-based index within the document.
    pub index: usize,
    /// The chunk text, tokens joined by single spaces.
    pub text: String,
    /// 1-based page number the chunk was taken from.
    pub page_number: usize,
}

/// Approximate token count via whitespace splitting.
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split pages into chunks of at most `max_tokens` whitespace tokens.
///
/// Chunks never span pages. Indices run sequentially across the whole
/// document in page order, so the same input always yields the same
/// chunk list. Pages with no tokens yield no chunks.
pub fn segment_pages(pages: &[Page], max_tokens: usize) -> Vec<Chunk> {
    // chunks(0) would panic
    let max_tokens = max_tokens.max(1);
    let mut chunks = Vec::new();

    for page in pages {
        let words: Vec<&str> = page.text.split_whitespace().collect();
        for window in words.chunks(max_tokens) {
            chunks.push(Chunk {
                index: chunks.len(),
                text: window.join(" "),
                page_number: page.page_number,
            });
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: usize, text: &str) -> Page {
        Page {
            page_number: number,
            text: text.to_string(),
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn oversized_page_splits_at_token_bound() {
        let pages = vec![page(1, &words(600))];
        let chunks = segment_pages(&pages, 500);

        assert_eq!(chunks.len(), 2);
        assert_eq!(count_tokens(&chunks[0].text), 500);
        assert_eq!(count_tokens(&chunks[1].text), 100);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[1].page_number, 1);
    }

    #[test]
    fn short_page_is_a_single_chunk() {
        let pages = vec![page(1, "hello world")];
        let chunks = segment_pages(&pages, 500);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
    }

    #[test]
    fn chunks_never_span_pages() {
        let pages = vec![page(1, &words(10)), page(2, &words(10))];
        let chunks = segment_pages(&pages, 500);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[1].page_number, 2);
    }

    #[test]
    fn indices_are_sequential_across_pages() {
        let pages = vec![page(1, &words(1200)), page(3, &words(700))];
        let chunks = segment_pages(&pages, 500);

        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(chunks[3].page_number, 3);
    }

    #[test]
    fn page_tokens_survive_segmentation_in_order() {
        let original = words(1234);
        let pages = vec![page(1, &original)];
        let chunks = segment_pages(&pages, 500);

        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, original);
    }

    #[test]
    fn whitespace_only_page_yields_no_chunks() {
        let pages = vec![page(1, "   \n\t  ")];
        assert!(segment_pages(&pages, 500).is_empty());
    }

    #[test]
    fn segmentation_is_deterministic() {
        let pages = vec![page(1, &words(750)), page(2, "tail words here")];
        assert_eq!(segment_pages(&pages, 300), segment_pages(&pages, 300));
    }
}
