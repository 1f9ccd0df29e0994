// Reference classifier pipeline: hash-tokenize the text, run an external
// logits model on tokio's blocking pool, reduce the output to the
// jailbreak-class probability.

use std::sync::Arc;

use async_trait::async_trait;
use slm_sandbox::{jailbreak_probability, HashTokenizer, TokenizedInput, JAILBREAK_LABEL_INDEX};

use super::{Classifier, ClassifierVerdict};
use crate::error::ClassifierError;

/// The neural part. Receives `(input_ids, attention_mask)` of length
/// `max_len` and returns either class logits or a single probability.
///
/// Called synchronously from a blocking worker thread.
pub trait LogitsModel: Send + Sync + 'static {
    fn run(&self, input: &TokenizedInput) -> Result<Vec<f32>, ClassifierError>;
}

#[derive(Debug)]
pub struct LogitsClassifier<M: LogitsModel> {
    model: Arc<M>,
    tokenizer: HashTokenizer,
    label_index: usize,
}

impl<M: LogitsModel> LogitsClassifier<M> {
    /// Default tokenizer, output layout `[SAFE, JAILBREAK]`.
    pub fn new(model: M) -> Self {
        LogitsClassifier {
            model: Arc::new(model),
            tokenizer: HashTokenizer::default(),
            label_index: JAILBREAK_LABEL_INDEX,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: HashTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_label_index(mut self, label_index: usize) -> Self {
        self.label_index = label_index;
        self
    }

    pub fn tokenizer(&self) -> &HashTokenizer {
        &self.tokenizer
    }
}

#[async_trait]
impl<M: LogitsModel> Classifier for LogitsClassifier<M> {
    async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError> {
        let input = self.tokenizer.tokenize(text);
        let model = Arc::clone(&self.model);

        let output = tokio::task::spawn_blocking(move || model.run(&input))
            .await
            .map_err(|e| ClassifierError::Inference(format!("inference task failed: {}", e)))??;

        let probability = jailbreak_probability(&output, self.label_index).ok_or_else(|| {
            ClassifierError::InvalidVerdict(format!(
                "no probability at index {} in model output of {} values",
                self.label_index,
                output.len()
            ))
        })?;

        Ok(ClassifierVerdict::from_probability(probability))
    }
}
