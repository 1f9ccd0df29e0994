// Deadline wrapper around any classifier.

use std::time::Duration;

use async_trait::async_trait;

use super::{Classifier, ClassifierVerdict};
use crate::error::ClassifierError;

/// Fails a call that does not finish within the deadline. The inner
/// future is dropped on expiry.
#[derive(Debug, Clone)]
pub struct TimeoutClassifier<C> {
    inner: C,
    timeout: Duration,
}

impl<C: Classifier> TimeoutClassifier<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        TimeoutClassifier { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: Classifier> Classifier for TimeoutClassifier<C> {
    async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError> {
        match tokio::time::timeout(self.timeout, self.inner.predict(text)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
