// Hash tokenizer for models trained on the same hashing scheme: the first
// 32 bits of the word's MD5 digest, reduced modulo the vocabulary size. The
// training pipeline computes ids the same way.
//
// Not compatible with pretrained subword vocabularies: a word's id is
// derived from a digest of the word, not looked up.

use md5::{Digest, Md5};

pub const DEFAULT_VOCAB_SIZE: u32 = 8192;
pub const DEFAULT_MAX_LEN: usize = 64;

/// Fixed-length model input. Both vectors are exactly `max_len` long;
/// id 0 and mask 0 mark padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedInput {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

impl TokenizedInput {
    /// Number of real (non-padding) tokens.
    pub fn token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

/// First four bytes of MD5 of the word's UTF-8 bytes, big-endian.
#[inline]
pub fn stable_hash(word: &str) -> u32 {
    let digest = Md5::digest(word.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashTokenizer {
    vocab_size: u32,
    max_len: usize,
}

impl Default for HashTokenizer {
    fn default() -> Self {
        Self {
            vocab_size: DEFAULT_VOCAB_SIZE,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl HashTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero is raised to 1.
    pub fn with_vocab_size(mut self, vocab_size: u32) -> Self {
        self.vocab_size = vocab_size.max(1);
        self
    }

    /// Zero is raised to 1.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }

    pub fn vocab_size(&self) -> u32 {
        self.vocab_size
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Lowercases, replaces everything outside `[a-z0-9]` and whitespace
    /// with a space, splits on whitespace and hashes the first `max_len`
    /// words into `1..=vocab_size`. Words past `max_len` are dropped.
    pub fn tokenize(&self, text: &str) -> TokenizedInput {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
            .collect();

        let mut input_ids = vec![0i64; self.max_len];
        let mut attention_mask = vec![0i64; self.max_len];

        for (i, word) in normalized.split_whitespace().take(self.max_len).enumerate() {
            input_ids[i] = i64::from(self.token_id(word));
            attention_mask[i] = 1;
        }

        TokenizedInput {
            input_ids,
            attention_mask,
        }
    }

    /// 0 is reserved for padding.
    #[inline]
    pub fn token_id(&self, word: &str) -> u32 {
        stable_hash(word) % self.vocab_size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_max_len() {
        let t = HashTokenizer::new().tokenize("hello world");
        assert_eq!(t.input_ids.len(), 64);
        assert_eq!(t.attention_mask.len(), 64);
        assert_eq!(t.token_count(), 2);
        assert!(t.input_ids[2..].iter().all(|&id| id == 0));
        assert_eq!(&t.attention_mask[..3], &[1, 1, 0]);
    }

    #[test]
    fn test_deterministic_and_case_insensitive() {
        let tok = HashTokenizer::new();
        assert_eq!(tok.tokenize("Ignore Previous"), tok.tokenize("ignore previous"));
        assert_eq!(tok.tokenize("abc"), tok.tokenize("abc"));
    }

    #[test]
    fn test_punctuation_splits_words() {
        let tok = HashTokenizer::new();
        let a = tok.tokenize("don't-stop!!");
        let b = tok.tokenize("don t stop");
        assert_eq!(a, b);
        assert_eq!(a.token_count(), 3);
    }

    #[test]
    fn test_ids_within_vocab() {
        let tok = HashTokenizer::new().with_vocab_size(10);
        let t = tok.tokenize("the quick brown fox jumps over the lazy dog 42 times");
        for (&id, &mask) in t.input_ids.iter().zip(&t.attention_mask) {
            if mask == 1 {
                assert!((1..=10).contains(&id));
            }
        }
        assert_eq!(t.input_ids[0], t.input_ids[6]);
    }

    #[test]
    fn test_truncates_long_input() {
        let tok = HashTokenizer::new().with_max_len(4);
        let t = tok.tokenize("one two three four five six");
        assert_eq!(t.input_ids.len(), 4);
        assert_eq!(t.token_count(), 4);
        assert_eq!(t.input_ids[3], i64::from(tok.token_id("four")));
    }

    #[test]
    fn test_empty_and_non_ascii_text() {
        let tok = HashTokenizer::new();
        assert_eq!(tok.tokenize("").token_count(), 0);
        assert_eq!(tok.tokenize("¿¡ — …").token_count(), 0);
        // Non-ASCII letters are separators, not word characters
        assert_eq!(tok.tokenize("naïve").token_count(), 2);
    }

    #[test]
    fn test_stable_hash_known_value() {
        // MD5("abc") = 90015098 3cd24fb0...
        assert_eq!(stable_hash("abc"), 0x9001_5098);
    }

    #[test]
    fn test_token_ids_match_training_pipeline() {
        // int(md5(word).hexdigest()[:8], 16) % 8192 + 1
        let tok = HashTokenizer::new();
        assert_eq!(tok.token_id("abc"), 4249);
        let t = tok.tokenize("ABC!");
        assert_eq!(t.input_ids[0], 4249);
        assert_eq!(t.token_count(), 1);
    }
}
