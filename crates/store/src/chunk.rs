//! Fixed-size text chunking.

/// Default chunk length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Split text into consecutive chunks of at most `size` characters.
///
/// Splits on character boundaries, never inside a UTF-8 sequence. A `size`
/// of zero yields the whole text as one chunk.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if size == 0 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_fixed_sizes() {
        let text = "a".repeat(2500);
        let chunks = chunk_text(&text, 1000);
        let lens: Vec<_> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![1000, 1000, 500]);
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 1000), vec!["hello"]);
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 1000).is_empty());
    }

    #[test]
    fn respects_char_boundaries() {
        let text = "é".repeat(5);
        let chunks = chunk_text(&text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn chunks_reassemble() {
        let text = "Security pillar. Reliability pillar. Cost optimization.";
        assert_eq!(chunk_text(text, 7).concat(), text);
    }
}
