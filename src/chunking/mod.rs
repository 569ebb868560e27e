//! Text chunking for training dispatch

use unicode_segmentation::UnicodeSegmentation;

use crate::types::Chunk;

/// Text chunker with configurable size and overlap ratio
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap carried between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. The overlap is `overlap_ratio * chunk_size`
    /// characters; a zero ratio disables overlap entirely.
    pub fn new(chunk_size: usize, overlap_ratio: f32) -> Self {
        let chunk_size = chunk_size.max(1);
        let overlap = (chunk_size as f32 * overlap_ratio.clamp(0.0, 0.5)) as usize;
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Split text into chunks.
    ///
    /// With custom delimiters the text splits exactly on them and no overlap
    /// is applied. Otherwise sentences accumulate up to the chunk size with
    /// the tail of each chunk carried into the next.
    pub fn split(&self, text: &str, custom_delimiters: &[String]) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if !custom_delimiters.is_empty() {
            return self.split_on_delimiters(text, custom_delimiters);
        }
        self.split_sentences(text)
    }

    fn split_on_delimiters(&self, text: &str, delimiters: &[String]) -> Vec<Chunk> {
        let mut pieces = vec![text.to_string()];
        for delimiter in delimiters {
            if delimiter.is_empty() {
                continue;
            }
            pieces = pieces
                .iter()
                .flat_map(|piece| piece.split(delimiter.as_str()))
                .map(String::from)
                .collect();
        }

        pieces
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .enumerate()
            .map(|(i, text)| Chunk {
                text,
                chunk_index: i as u32,
            })
            .collect()
    }

    fn split_sentences(&self, text: &str) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut current = String::new();

        for sentence in text.split_sentence_bounds() {
            if !current.is_empty() && current.len() + sentence.len() > self.chunk_size {
                self.push_chunk(&mut chunks, &current);
                current = self.overlap_text(&current);
            }
            current.push_str(sentence);
        }
        if !current.trim().is_empty() {
            self.push_chunk(&mut chunks, &current);
        }

        chunks
    }

    fn push_chunk(&self, chunks: &mut Vec<Chunk>, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        chunks.push(Chunk {
            text: text.to_string(),
            chunk_index: chunks.len() as u32,
        });
    }

    /// Tail of a finished chunk to carry into the next one, snapped to a
    /// sentence or word boundary where possible
    fn overlap_text(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        let text = text.trim_end();
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len().saturating_sub(self.overlap);
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }
        let tail = &text[start..];

        if let Some(pos) = tail.find(". ") {
            let rest = &tail[pos + 2..];
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
        if let Some(pos) = tail.find(' ') {
            let rest = &tail[pos + 1..];
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
        tail.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("Sentence number {i} carries a bit of body text. "))
            .collect()
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        let chunker = TextChunker::new(512, 0.2);
        assert!(chunker.split("", &[]).is_empty());
        assert!(chunker.split("   \n", &[]).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = TextChunker::new(512, 0.2);
        let chunks = chunker.split("Just one sentence.", &[]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Just one sentence.");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn chunks_are_indexed_and_sized() {
        let chunker = TextChunker::new(200, 0.2);
        let chunks = chunker.split(&sentences(30), &[]);
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
            // one sentence of slack past the target size
            assert!(chunk.text.len() <= 200 + 60, "chunk too big: {}", chunk.text.len());
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let chunker = TextChunker::new(200, 0.2);
        let chunks = chunker.split(&sentences(30), &[]);
        let first_tail: String = chunks[0]
            .text
            .chars()
            .rev()
            .take(20)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        assert!(
            chunks[1].text.contains(first_tail.trim()),
            "second chunk does not carry the first chunk's tail"
        );
    }

    #[test]
    fn zero_ratio_disables_overlap() {
        let chunker = TextChunker::new(200, 0.0);
        let chunks = chunker.split(&sentences(30), &[]);
        assert!(chunks.len() > 1);
        let first_tail: String = chunks[0].text.chars().rev().take(30).collect();
        let reversed: String = first_tail.chars().rev().collect();
        assert!(!chunks[1].text.starts_with(reversed.trim()));
    }

    #[test]
    fn custom_delimiter_splits_exactly() {
        let chunker = TextChunker::new(10, 0.2);
        let chunks = chunker.split("part one###part two###part three", &["###".to_string()]);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["part one", "part two", "part three"]);
    }
}
