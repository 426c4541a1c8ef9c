//! Sliding-window chunking of word streams.
//!
//! Inference backends accept a bounded number of input tokens, so long
//! documents are split into overlapping word windows. The overlap keeps
//! sentences that straddle a window boundary fully inside at least one
//! chunk.

use thiserror::Error;

/// Errors from chunking configuration.
///
/// Both variants are configuration errors and are rejected before any
/// processing starts; `chunk()` itself cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk window must be at least one word")]
    EmptyWindow,

    #[error("overlap ({overlap}) must be smaller than window size ({window_size})")]
    OverlapExceedsWindow { window_size: usize, overlap: usize },
}

/// A contiguous word window over a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the chunking pass.
    pub index: usize,
    /// Word offset of the first word in the window.
    pub start: usize,
    /// Window text, words re-joined with single spaces.
    pub text: String,
}

/// Splits word streams into overlapping bounded windows.
///
/// Chunk `k` covers words `[k*stride, k*stride + window_size)` where
/// `stride = window_size - overlap`. The final chunk may be shorter
/// than the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunker {
    window_size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a chunker, validating that the configuration terminates.
    ///
    /// `overlap >= window_size` would give a stride of zero and loop
    /// forever, so it is rejected here.
    pub fn new(window_size: usize, overlap: usize) -> Result<Self, ChunkError> {
        if window_size == 0 {
            return Err(ChunkError::EmptyWindow);
        }
        if overlap >= window_size {
            return Err(ChunkError::OverlapExceedsWindow {
                window_size,
                overlap,
            });
        }
        Ok(Self {
            window_size,
            overlap,
        })
    }

    /// Distance between consecutive chunk start offsets.
    pub fn stride(&self) -> usize {
        self.window_size - self.overlap
    }

    /// Split text into overlapping word windows.
    ///
    /// Words are whitespace-delimited; the window bound is a word
    /// count, not a character count. Empty input produces no chunks;
    /// input shorter than the window produces exactly one.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.window_size).min(words.len());
            chunks.push(Chunk {
                index: chunks.len(),
                start,
                text: words[start..end].join(" "),
            });
            if end == words.len() {
                break;
            }
            start += self.stride();
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_doc(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_rejects_zero_window() {
        assert_eq!(Chunker::new(0, 0), Err(ChunkError::EmptyWindow));
    }

    #[test]
    fn test_rejects_overlap_at_least_window() {
        assert_eq!(
            Chunker::new(10, 10),
            Err(ChunkError::OverlapExceedsWindow {
                window_size: 10,
                overlap: 10
            })
        );
        assert_eq!(
            Chunker::new(10, 15),
            Err(ChunkError::OverlapExceedsWindow {
                window_size: 10,
                overlap: 15
            })
        );
    }

    #[test]
    fn test_empty_input_no_chunks() {
        let chunker = Chunker::new(100, 20).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\t  ").is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let chunker = Chunker::new(100, 20).unwrap();
        let chunks = chunker.chunk("one two three");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].text, "one two three");
    }

    #[test]
    fn test_chunk_offsets_follow_stride() {
        let chunker = Chunker::new(5, 2).unwrap();
        let chunks = chunker.chunk(&word_doc(12));
        assert_eq!(chunker.stride(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.start, i * chunker.stride());
        }
    }

    #[test]
    fn test_every_word_covered_without_gaps() {
        for (total, window, overlap) in [(12, 5, 2), (100, 7, 3), (1500, 1000, 200), (9, 4, 0)] {
            let chunker = Chunker::new(window, overlap).unwrap();
            let chunks = chunker.chunk(&word_doc(total));

            let mut covered = vec![false; total];
            for chunk in &chunks {
                let len = chunk.text.split_whitespace().count();
                for w in chunk.start..chunk.start + len {
                    covered[w] = true;
                }
            }
            assert!(covered.iter().all(|&c| c), "gap for {:?}", (total, window, overlap));

            // No gap between a chunk's end and the next chunk's start minus overlap
            for pair in chunks.windows(2) {
                let end = pair[0].start + pair[0].text.split_whitespace().count();
                assert!(pair[1].start <= end, "discontinuity at chunk {}", pair[1].index);
            }
        }
    }

    #[test]
    fn test_final_chunk_may_be_short() {
        let chunker = Chunker::new(1000, 200).unwrap();
        let chunks = chunker.chunk(&word_doc(1500));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[1].start, 800);
        assert_eq!(chunks[1].text.split_whitespace().count(), 700);
    }

    #[test]
    fn test_deterministic() {
        let chunker = Chunker::new(8, 3).unwrap();
        let doc = word_doc(50);
        assert_eq!(chunker.chunk(&doc), chunker.chunk(&doc));
    }
}
