//! Riddle freshness
//!
//! Decides, per request, whether to serve an unseen cached riddle or to
//! generate a new one, and how to degrade when generation fails.
//!
//! ```text
//! unseen >= 3 ──────────────► random unseen            (Cached)
//!     │ no
//!     ▼
//! generate ── ok ──► translate? ──► persist            (Generated)
//!     │ exhausted
//!     ▼
//! any unseen ───────────────► random unseen            (UnseenFallback)
//!     │ none
//!     ▼
//! any in language ──────────► random, seen reset       (Exhausted)
//!     │ none
//!     ▼
//! ServiceUnavailable
//! ```

use std::sync::Arc;

use rand::seq::SliceRandom;
use riddler_agent::Translator;
use tracing::{debug, info, warn};

use crate::db::schemas::{RiddleDoc, SOURCE_TRANSLATED};
use crate::db::ContentStore;
use crate::engine::generator::Generator;
use crate::engine::prompts::is_known_category;
use crate::engine::text::{content_hash, normalize};
use crate::types::{Result, RiddlerError};

/// Unseen riddles needed before the cache is preferred over generation
pub const MIN_CACHED_CANDIDATES: usize = 3;

const SOURCE_LANGUAGE: &str = "en";

/// Which branch produced a riddle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cached,
    Generated,
    UnseenFallback,
    /// Every riddle in the language was seen; the caller resets the seen set
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct Obtained {
    pub riddle: RiddleDoc,
    pub served_from: ServedFrom,
}

fn pick(riddles: &[RiddleDoc]) -> Option<RiddleDoc> {
    riddles.choose(&mut rand::thread_rng()).cloned()
}

#[derive(Clone)]
pub struct FreshnessEngine {
    store: Arc<dyn ContentStore>,
    generator: Generator,
    translator: Arc<dyn Translator>,
}

impl FreshnessEngine {
    pub fn new(
        store: Arc<dyn ContentStore>,
        generator: Generator,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            store,
            generator,
            translator,
        }
    }

    /// Find or create a riddle the user has not seen.
    ///
    /// Unknown categories are ignored rather than rejected.
    pub async fn obtain(
        &self,
        language: &str,
        category: Option<&str>,
        seen: &[String],
    ) -> Result<Obtained> {
        let category = category.filter(|c| is_known_category(c));

        let candidates = self.store.unseen_riddles(language, category, seen).await?;
        debug!(
            language,
            category = category.unwrap_or("any"),
            unseen = candidates.len(),
            "Freshness lookup"
        );

        if candidates.len() >= MIN_CACHED_CANDIDATES {
            if let Some(riddle) = pick(&candidates) {
                return Ok(Obtained {
                    riddle,
                    served_from: ServedFrom::Cached,
                });
            }
        }

        if let Some(riddle) = self.generator.generate(category.unwrap_or("general")).await? {
            let riddle = if language == SOURCE_LANGUAGE {
                riddle
            } else {
                self.localize(riddle, language, seen).await?
            };
            return Ok(Obtained {
                riddle,
                served_from: ServedFrom::Generated,
            });
        }

        if let Some(riddle) = pick(&candidates) {
            info!(language, "Generation failed, serving an unseen cached riddle");
            return Ok(Obtained {
                riddle,
                served_from: ServedFrom::UnseenFallback,
            });
        }

        let everything = self.store.riddles_in_language(language).await?;
        if let Some(riddle) = pick(&everything) {
            info!(language, "All riddles seen, recycling the corpus");
            return Ok(Obtained {
                riddle,
                served_from: ServedFrom::Exhausted,
            });
        }

        Err(RiddlerError::ServiceUnavailable(
            "No riddles available. Try again in a moment.".into(),
        ))
    }

    /// Translated copy of an English riddle, persisted under its own hash.
    ///
    /// Falls back to the English riddle when translation fails, or when the
    /// translated hash belongs to another language or to a riddle already seen.
    async fn localize(
        &self,
        riddle: RiddleDoc,
        language: &str,
        seen: &[String],
    ) -> Result<RiddleDoc> {
        let translated = async {
            let question = self
                .translator
                .translate(&riddle.question, SOURCE_LANGUAGE, language)
                .await?;
            let answer = self
                .translator
                .translate(&riddle.answer, SOURCE_LANGUAGE, language)
                .await?;
            Ok::<_, riddler_agent::TranslateError>((question, answer))
        }
        .await;

        let (question, answer) = match translated {
            Ok(pair) => pair,
            Err(e) => {
                warn!(language, "Translation failed, serving English riddle: {}", e);
                return Ok(riddle);
            }
        };

        let question = question.trim().to_string();
        let answer = normalize(&answer);
        let hash = content_hash(&question, &answer);

        if let Some(existing) = self.store.riddle_by_hash(&hash).await? {
            return Ok(reuse_translation(existing, riddle, language, seen));
        }

        let mut localized = RiddleDoc::new(
            question,
            answer,
            hash.clone(),
            riddle.category.clone(),
            riddle.difficulty,
            language.to_string(),
            SOURCE_TRANSLATED,
        );
        localized.hints = riddle.hints.clone();

        if self.store.insert_riddle(localized.clone()).await? {
            info!(language, riddle_id = %localized.id, "Persisted translated riddle");
            return Ok(localized);
        }

        // Lost an insert race to an identical translation
        Ok(match self.store.riddle_by_hash(&hash).await? {
            Some(existing) => reuse_translation(existing, riddle, language, seen),
            None => riddle,
        })
    }
}

/// A stored translation is served only when it is in `language` and unseen
fn reuse_translation(
    existing: RiddleDoc,
    english: RiddleDoc,
    language: &str,
    seen: &[String],
) -> RiddleDoc {
    if existing.language != language {
        warn!(
            language,
            found = %existing.language,
            "Translation matches a riddle in another language, serving English riddle"
        );
        return english;
    }
    if seen.contains(&existing.id) {
        debug!(language, riddle_id = %existing.id, "Stored translation already seen");
        return english;
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::Difficulty;
    use crate::db::MemoryStore;
    use riddler_agent::{MockBackend, MockTranslator};

    fn riddle(question: &str, answer: &str, language: &str) -> RiddleDoc {
        RiddleDoc::new(
            question.into(),
            answer.into(),
            content_hash(question, answer),
            "general".into(),
            Difficulty::Easy,
            language.into(),
            "generated",
        )
    }

    fn engine(
        store: Arc<MemoryStore>,
        backend: MockBackend,
        translator: MockTranslator,
    ) -> FreshnessEngine {
        let generator = Generator::new(store.clone(), Arc::new(backend));
        FreshnessEngine::new(store, generator, Arc::new(translator))
    }

    #[tokio::test]
    async fn test_prefers_cache_with_enough_candidates() {
        let store = Arc::new(MemoryStore::new());
        for (q, a) in [("q1", "bridge"), ("q2", "compass"), ("q3", "library")] {
            store.insert_riddle(riddle(q, a, "en")).await.unwrap();
        }
        let backend = MockBackend::new("mock");
        let engine = engine(store, backend, MockTranslator::new());

        let obtained = engine.obtain("en", None, &[]).await.unwrap();
        assert_eq!(obtained.served_from, ServedFrom::Cached);
    }

    #[tokio::test]
    async fn test_generates_when_cache_is_thin() {
        let store = Arc::new(MemoryStore::new());
        store.insert_riddle(riddle("q1", "bridge", "en")).await.unwrap();
        let backend = MockBackend::new("mock")
            .then_reply(r#"{"question": "I point north", "answer": "compass"}"#);
        let engine = engine(store, backend, MockTranslator::new());

        let obtained = engine.obtain("en", Some("sports"), &[]).await.unwrap();
        assert_eq!(obtained.served_from, ServedFrom::Generated);
        assert_eq!(obtained.riddle.answer, "compass");
        assert_eq!(obtained.riddle.category, "general");
    }

    #[tokio::test]
    async fn test_fallbacks_when_generation_fails() {
        let store = Arc::new(MemoryStore::new());
        let only = riddle("q1", "bridge", "en");
        let only_id = only.id.clone();
        store.insert_riddle(only).await.unwrap();
        let engine = engine(
            store,
            MockBackend::new("mock").with_available(false),
            MockTranslator::new(),
        );

        let unseen = engine.obtain("en", None, &[]).await.unwrap();
        assert_eq!(unseen.served_from, ServedFrom::UnseenFallback);

        let recycled = engine.obtain("en", None, &[only_id.clone()]).await.unwrap();
        assert_eq!(recycled.served_from, ServedFrom::Exhausted);
        assert_eq!(recycled.riddle.id, only_id);

        let err = engine.obtain("fr", None, &[]).await.unwrap_err();
        assert!(matches!(err, RiddlerError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_translation_persists_localized_copy() {
        let store = Arc::new(MemoryStore::new());
        let backend = MockBackend::new("mock")
            .then_reply(r#"{"question": "I span rivers", "answer": "bridge"}"#);
        let translator = MockTranslator::new()
            .with_entry("I span rivers", "मैं नदियों को पार करता हूँ")
            .with_entry("bridge", "पुल");
        let engine = engine(store.clone(), backend, translator);

        let obtained = engine.obtain("hi", None, &[]).await.unwrap();
        assert_eq!(obtained.riddle.language, "hi");
        assert_eq!(obtained.riddle.answer, "पुल");
        assert_eq!(obtained.riddle.source, SOURCE_TRANSLATED);
        assert_eq!(store.count_riddles(Some("en"), None).await.unwrap(), 1);
        assert_eq!(store.count_riddles(Some("hi"), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_translation_never_reuses_other_language_row() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_riddle(riddle("What has keys but opens nothing", "piano", "en"))
            .await
            .unwrap();
        let backend = MockBackend::new("mock")
            .then_reply(r#"{"question": "I span rivers", "answer": "bridge"}"#);
        let translator = MockTranslator::new()
            .with_entry("I span rivers", "What has keys but opens nothing")
            .with_entry("bridge", "piano");
        let engine = engine(store.clone(), backend, translator);

        let obtained = engine.obtain("hi", None, &[]).await.unwrap();
        assert_eq!(obtained.riddle.answer, "bridge");
        assert_eq!(store.count_riddles(Some("hi"), None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seen_translation_is_not_served_again() {
        let store = Arc::new(MemoryStore::new());
        let known = riddle("मैं नदियों को पार करता हूँ", "पुल", "hi");
        let known_id = known.id.clone();
        store.insert_riddle(known).await.unwrap();
        let backend = MockBackend::new("mock")
            .then_reply(r#"{"question": "I span rivers", "answer": "bridge"}"#);
        let translator = MockTranslator::new()
            .with_entry("I span rivers", "मैं नदियों को पार करता हूँ")
            .with_entry("bridge", "पुल");
        let engine = engine(store, backend, translator);

        let obtained = engine.obtain("hi", None, &[known_id.clone()]).await.unwrap();
        assert_ne!(obtained.riddle.id, known_id);
        assert_eq!(obtained.riddle.answer, "bridge");
    }

    #[tokio::test]
    async fn test_translation_failure_serves_english() {
        let store = Arc::new(MemoryStore::new());
        let backend = MockBackend::new("mock")
            .then_reply(r#"{"question": "I span rivers", "answer": "bridge"}"#);
        let engine = engine(
            store.clone(),
            backend,
            MockTranslator::new().with_failure(true),
        );

        let obtained = engine.obtain("hi", None, &[]).await.unwrap();
        assert_eq!(obtained.riddle.language, "en");
        assert_eq!(store.count_riddles(Some("hi"), None).await.unwrap(), 0);
    }
}
