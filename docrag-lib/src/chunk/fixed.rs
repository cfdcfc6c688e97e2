use crate::chunk::Chunk;
use crate::{Error, Result};

/// Fixed-size chunker - splits by character count with overlap
///
/// Sizes and offsets count characters, not bytes, so a chunk boundary never
/// lands inside a multi-byte code point. The final chunk may be shorter than
/// `chunk_size` and is kept as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a chunker, rejecting parameters that would never advance.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Configuration("chunk size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split content into chunks with ids `1..=n`.
    #[must_use]
    pub fn chunk(&self, content: &str) -> Vec<Chunk> {
        // byte offset of every char, plus the end of the string
        let bounds: Vec<usize> = content
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(content.len()))
            .collect();
        let len = bounds.len() - 1;

        let stride = self.chunk_size - self.overlap;
        let mut chunks = Vec::with_capacity(len.div_ceil(stride));
        let mut start = 0;
        while start < len {
            let end = (start + self.chunk_size).min(len);
            chunks.push(Chunk {
                id: chunks.len() + 1,
                content: content[bounds[start]..bounds[end]].to_string(),
                offset: start,
            });
            start += stride;
        }
        chunks
    }
}

/// Chunk `content` in one call, validating the parameters first.
pub fn chunk_text(content: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    FixedSizeChunker::new(chunk_size, overlap).map(|chunker| chunker.chunk(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stitch chunks back together, dropping the characters each chunk
    /// shares with the one before it.
    fn reassemble(chunks: &[Chunk]) -> String {
        let mut out = String::new();
        let mut covered: usize = 0;
        for chunk in chunks {
            let skip = covered.saturating_sub(chunk.offset);
            out.extend(chunk.content.chars().skip(skip));
            covered = covered.max(chunk.offset + chunk.content.chars().count());
        }
        out
    }

    #[test]
    fn test_basic_chunking() {
        let chunks = chunk_text("0123456789abcdefghij", 10, 0).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "0123456789");
        assert_eq!(chunks[1].content, "abcdefghij");
    }

    #[test]
    fn test_overlap() {
        let chunks = chunk_text("0123456789abcdefghij", 10, 5).unwrap();

        // stride=5, so offsets: 0, 5, 10, 15
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].content, "0123456789");
        assert_eq!(chunks[1].content, "56789abcde");
        assert_eq!(chunks[2].content, "abcdefghij");
        assert_eq!(chunks[3].content, "fghij"); // trailing chunk kept short
    }

    #[test]
    fn test_thousand_chars_with_default_parameters() {
        let text = "x".repeat(1000);
        let chunks = chunk_text(&text, 500, 50).unwrap();

        let spans: Vec<_> = chunks
            .iter()
            .map(|c| (c.id, c.offset, c.offset + c.content.len()))
            .collect();
        assert_eq!(spans, vec![(1, 0, 500), (2, 450, 950), (3, 900, 1000)]);
    }

    #[test]
    fn test_ids_are_sequential_from_one() {
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        let chunks = chunk_text(&text, 37, 11).unwrap();

        let ids: Vec<_> = chunks.iter().map(|c| c.id).collect();
        let expected: Vec<_> = (1..=chunks.len()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_reassembles_to_original() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(23);
        for (size, overlap) in [(1, 0), (7, 3), (50, 49), (100, 10), (5000, 50)] {
            let chunks = chunk_text(&text, size, overlap).unwrap();
            assert_eq!(reassemble(&chunks), text, "size={size} overlap={overlap}");
        }
    }

    #[test]
    fn test_unicode_safety() {
        let text = "Hello 👋 Wörld, ça va? 日本語のテキスト";
        let chunks = chunk_text(text, 5, 2).unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 5);
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_idempotent() {
        let text = "Repeatable input produces repeatable chunks.".repeat(9);
        let chunker = FixedSizeChunker::new(64, 16).unwrap();

        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_rejected() {
        assert!(matches!(FixedSizeChunker::new(50, 50), Err(Error::Configuration(_))));
        assert!(matches!(FixedSizeChunker::new(50, 80), Err(Error::Configuration(_))));
        assert!(matches!(chunk_text("abc", 0, 0), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_content() {
        let chunks = chunk_text("", 10, 0).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_text_shorter_than_chunk() {
        let chunks = chunk_text("short", 500, 50).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short");
        assert_eq!(chunks[0].offset, 0);
    }
}
