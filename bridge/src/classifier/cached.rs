// Verdict cache keyed by the SHA-256 of the text.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rule_engine::fingerprint;

use super::{Classifier, ClassifierVerdict};
use crate::error::ClassifierError;

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Memoizes successful verdicts. Errors are never cached.
///
/// The map holds at most `capacity` entries; inserting into a full cache
/// flushes it first. Concurrent misses on the same text may each call the
/// inner classifier.
#[derive(Debug)]
pub struct CachedClassifier<C> {
    inner: C,
    capacity: usize,
    entries: RwLock<HashMap<String, ClassifierVerdict>>,
}

impl<C: Classifier> CachedClassifier<C> {
    pub fn new(inner: C) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Zero is raised to 1.
    pub fn with_capacity(inner: C, capacity: usize) -> Self {
        CachedClassifier {
            inner,
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn insert(&self, key: String, verdict: ClassifierVerdict) {
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.clear();
        }
        entries.insert(key, verdict);
    }
}

#[async_trait]
impl<C: Classifier> Classifier for CachedClassifier<C> {
    async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError> {
        let key = fingerprint(text);

        let cached = self.entries.read().get(&key).cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        // Lock is not held across the inner call
        let verdict = self.inner.predict(text).await?;
        self.insert(key, verdict.clone());
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingClassifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Classifier for CountingClassifier {
        async fn predict(&self, text: &str) -> Result<ClassifierVerdict, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text == "fail" {
                return Err(ClassifierError::Unavailable("down".to_string()));
            }
            Ok(ClassifierVerdict::from_probability(text.len() as f32 / 100.0))
        }
    }

    #[tokio::test]
    async fn repeated_text_hits_cache() {
        let counter = Arc::new(CountingClassifier::default());
        let cached = CachedClassifier::new(Arc::clone(&counter));

        let first = cached.predict("hello").await.unwrap();
        let second = cached.predict("hello").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let counter = Arc::new(CountingClassifier::default());
        let cached = CachedClassifier::new(Arc::clone(&counter));

        assert!(cached.predict("fail").await.is_err());
        assert!(cached.predict("fail").await.is_err());
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }

    #[tokio::test]
    async fn full_cache_is_flushed() {
        let counter = Arc::new(CountingClassifier::default());
        let cached = CachedClassifier::with_capacity(Arc::clone(&counter), 2);

        cached.predict("a").await.unwrap();
        cached.predict("b").await.unwrap();
        assert_eq!(cached.len(), 2);

        cached.predict("c").await.unwrap();
        assert_eq!(cached.len(), 1);

        cached.clear();
        assert!(cached.is_empty());
    }
}
