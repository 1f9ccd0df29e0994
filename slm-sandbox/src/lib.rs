// SLM Sandbox - deterministic pre- and post-processing for small jailbreak
// classifiers. Neural inference itself lives outside this crate; this crate
// turns text into model inputs and model outputs into a probability.

mod logits;
mod tokenizer;

pub use logits::{jailbreak_probability, softmax, JAILBREAK_LABEL_INDEX};
pub use tokenizer::{
    stable_hash, HashTokenizer, TokenizedInput, DEFAULT_MAX_LEN, DEFAULT_VOCAB_SIZE,
};

/// Version of the tokenization scheme. Models must be trained against the
/// same version. Version 2 hashes words with MD5.
pub fn tokenizer_version() -> u32 {
    2
}
