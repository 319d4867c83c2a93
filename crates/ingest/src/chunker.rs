//! Word-window chunking.
//!
//! Text is split on whitespace and re-joined into fixed-size windows that
//! overlap by a fixed number of words, so that a sentence cut at a chunk
//! boundary still appears whole in the neighboring chunk. Chunk ids are
//! `<source_file>-<start_word>`, which makes re-ingestion of the same file
//! an overwrite rather than a duplicate.

use gearoracle_attestation::content_hash;

/// One chunk of a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Stable id, `<source_file>-<start_word>`.
    pub id: String,

    /// Word offset of the chunk within the document.
    pub start_word: usize,

    /// The chunk text, words re-joined with single spaces.
    pub text: String,

    /// SHA-256 hex digest of `text`, stored so attestation hashes can be
    /// checked against the index without re-reading the source.
    pub hash: String,
}

/// Split `text` into overlapping word windows of `chunk_size` words,
/// overlapping by `overlap` words. `overlap` must be smaller than
/// `chunk_size`; the final window may be shorter.
pub fn chunk_text(source_file: &str, text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    assert!(chunk_size > 0, "chunk_size must be positive");
    assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = usize::min(start + chunk_size, words.len());
        let chunk_words = &words[start..end];
        let text = chunk_words.join(" ");
        chunks.push(Chunk {
            id: format!("{source_file}-{start}"),
            start_word: start,
            hash: content_hash(&text),
            text,
        });
        if end == words.len() {
            break;
        }
        start += stride;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("manual.pdf", "check tire pressure monthly", 400, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "manual.pdf-0");
        assert_eq!(chunks[0].start_word, 0);
        assert_eq!(chunks[0].text, "check tire pressure monthly");
    }

    #[test]
    fn windows_overlap_by_configured_words() {
        let text = numbered_words(900);
        let chunks = chunk_text("manual.pdf", &text, 400, 50);

        // Strides of 350: starts at 0, 350, 700.
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].start_word, 0);
        assert_eq!(chunks[1].start_word, 350);
        assert_eq!(chunks[2].start_word, 700);
        assert_eq!(chunks[1].id, "manual.pdf-350");

        // Last 50 words of chunk 0 are the first 50 of chunk 1.
        assert!(chunks[0].text.ends_with("w399"));
        assert!(chunks[1].text.starts_with("w350 "));

        // Final window is the 200-word remainder.
        assert!(chunks[2].text.ends_with("w899"));
    }

    #[test]
    fn whitespace_is_normalized() {
        let chunks = chunk_text("m.pdf", "  a\n\nb\tc  ", 400, 50);
        assert_eq!(chunks[0].text, "a b c");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("m.pdf", "   \n ", 400, 50).is_empty());
    }

    #[test]
    fn hash_matches_chunk_text() {
        let chunks = chunk_text("m.pdf", "a b c", 400, 50);
        assert_eq!(chunks[0].hash, content_hash("a b c"));
        assert_eq!(chunks[0].hash.len(), 64);
    }

    #[test]
    fn exact_multiple_does_not_emit_empty_tail() {
        let text = numbered_words(400);
        let chunks = chunk_text("m.pdf", &text, 400, 50);
        assert_eq!(chunks.len(), 1);
    }
}
