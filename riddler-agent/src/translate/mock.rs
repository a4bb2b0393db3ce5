//! Mock translator for testing and offline development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::{TranslateError, Translator};

/// Deterministic translator.
///
/// Known phrases map through the dictionary; anything else is tagged with the
/// target language, e.g. `"bridge"` -> `"[hi] bridge"`.
pub struct MockTranslator {
    dictionary: HashMap<String, String>,
    failing: AtomicBool,
    call_count: AtomicU32,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            dictionary: HashMap::new(),
            failing: AtomicBool::new(false),
            call_count: AtomicU32::new(0),
        }
    }

    /// Add a fixed translation.
    pub fn with_entry(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.dictionary.insert(from.into(), to.into());
        self
    }

    /// Make every call fail.
    pub fn with_failure(self, failing: bool) -> Self {
        self.failing.store(failing, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(TranslateError::NetworkError("Mock translator disabled".into()));
        }

        Ok(self
            .dictionary
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}] {}", target, text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dictionary_and_tagging() {
        let translator = MockTranslator::new().with_entry("bridge", "पुल");

        assert_eq!(translator.translate("bridge", "en", "hi").await.unwrap(), "पुल");
        assert_eq!(
            translator.translate("compass", "en", "hi").await.unwrap(),
            "[hi] compass"
        );
        assert_eq!(translator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_mode() {
        let translator = MockTranslator::new().with_failure(true);
        assert!(translator.translate("x", "en", "hi").await.is_err());
    }
}
