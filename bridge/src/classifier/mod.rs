//! # Classifier Collaborators
//!
//! The fusion agent consults a probabilistic jailbreak classifier through
//! the [`Classifier`] trait. Implementations:
//! - [`NoOpClassifier`]: always SAFE, the explicit default
//! - [`KeywordClassifier`]: deterministic keyword heuristic
//! - [`LogitsClassifier`]: hash tokenizer + external logits model
//!
//! Wrappers that compose with any of them:
//! - [`TimeoutClassifier`]: bounds latency, turns a hung call into an error
//! - [`CachedClassifier`]: memoizes verdicts by content hash

mod cached;
mod keyword;
mod logits;
mod timeout;

pub use cached::{CachedClassifier, DEFAULT_CACHE_CAPACITY};
pub use keyword::KeywordClassifier;
pub use logits::{LogitsClassifier, LogitsModel};
pub use timeout::TimeoutClassifier;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

pub const SAFE_LABEL: &str = "SAFE";
pub const JAILBREAK_LABEL: &str = "JAILBREAK";

/// Probability at or above which a probability-only model labels a text
/// as a jailbreak.
pub const JAILBREAK_LABEL_THRESHOLD: f32 = 0.5;

// ================================================================================================
// VERDICT
// ================================================================================================

/// One classifier answer. `probability` is the jailbreak-class probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub label: String,
    pub probability: f32,
}

impl ClassifierVerdict {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        ClassifierVerdict {
            label: label.into(),
            probability,
        }
    }

    pub fn safe(probability: f32) -> Self {
        Self::new(SAFE_LABEL, probability)
    }

    pub fn jailbreak(probability: f32) -> Self {
        Self::new(JAILBREAK_LABEL, probability)
    }

    /// Labels by [`JAILBREAK_LABEL_THRESHOLD`].
    pub fn from_probability(probability: f32) -> Self {
        if probability >= JAILBREAK_LABEL_THRESHOLD {
            Self::jailbreak(probability)
        } else {
            Self::safe(probability)
        }
    }

    pub fn is_jailbreak(&self) -> bool {
        self.label == JAILBREAK_LABEL
    }

    /// Rejects NaN and probabilities outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ClassifierError::InvalidVerdict(format!(
                "probability {} outside [0, 1]",
                self.probability
            )));
        }
        Ok(())
    }
}

// ================================================================================================
// CLASSIFIER TRAIT
// ================================================================================================

/// Jailbreak classifier. Must be deterministic for fixed model weights and
/// input. One call per request; batching is the implementation's concern.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError>;
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError> {
        (**self).predict(text).await
    }
}

/// Default collaborator when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpClassifier;

#[async_trait]
impl Classifier for NoOpClassifier {
    async fn predict(&self, _text: &str) -> Result<ClassifierVerdict, ClassifierError> {
        Ok(ClassifierVerdict::safe(0.0))
    }
}
