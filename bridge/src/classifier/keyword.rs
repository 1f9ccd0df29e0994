// Keyword heuristic classifier. Deterministic stand-in for a model, useful
// for demos and for exercising the fusion path without inference.

use async_trait::async_trait;

use super::{Classifier, ClassifierVerdict};
use crate::error::ClassifierError;

const DEFAULT_KEYWORDS: &[&str] = &[
    "ignore previous instructions",
    "reveal system prompt",
    "do anything now",
    "bypass policy",
    "jailbreak",
];

const HIT_PROBABILITY: f32 = 0.92;
const MISS_PROBABILITY: f32 = 0.08;

/// Any keyword present (case-insensitive) → JAILBREAK 0.92, else SAFE 0.08.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::with_keywords(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank keywords are dropped.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        KeywordClassifier {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError> {
        let lower = text.to_lowercase();
        if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
            Ok(ClassifierVerdict::jailbreak(HIT_PROBABILITY))
        } else {
            Ok(ClassifierVerdict::safe(MISS_PROBABILITY))
        }
    }
}
