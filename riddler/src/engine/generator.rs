//! Riddle generation
//!
//! One call to [`Generator::generate`] runs a bounded attempt loop against
//! the completion backend. Each attempt either yields a new, unique English
//! riddle that is already persisted, or a [`Rejection`] that is logged and
//! retried. Provider failures never escape; store failures do.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use riddler_agent::{LlmBackend, LlmError};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::db::schemas::{Difficulty, RiddleDoc, SOURCE_GENERATED};
use crate::db::ContentStore;
use crate::engine::prompts;
use crate::engine::text::{content_hash, normalize};
use crate::types::Result;

/// Attempts per generation request
pub const MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Recent answers considered for the avoid-list
const RECENT_ANSWER_WINDOW: usize = 100;

/// Language of record for generated riddles
const GENERATION_LANGUAGE: &str = "en";

static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^{}]*"question"[^{}]*"answer"[^{}]*\}"#).expect("valid regex")
});

/// Progress of one generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    Attempting(u32),
    Accepted,
    Exhausted,
}

impl GenerationState {
    /// State after the current attempt was rejected
    pub fn after_rejection(self) -> Self {
        match self {
            Self::Idle => Self::Attempting(1),
            Self::Attempting(n) if n < MAX_GENERATION_ATTEMPTS => Self::Attempting(n + 1),
            Self::Attempting(_) => Self::Exhausted,
            done => done,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Exhausted)
    }
}

/// Why an attempt did not produce a riddle
#[derive(Debug)]
pub enum Rejection {
    Provider(LlmError),
    Unparseable,
    EmptyAnswer,
    MultiWordAnswer(String),
    Blocklisted(String),
    Duplicate(String),
    InsertCollision(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(e) => write!(f, "provider error: {}", e),
            Self::Unparseable => write!(f, "no riddle object in completion"),
            Self::EmptyAnswer => write!(f, "empty answer"),
            Self::MultiWordAnswer(a) => write!(f, "answer is multiple words: {}", a),
            Self::Blocklisted(a) => write!(f, "overused answer: {}", a),
            Self::Duplicate(a) => write!(f, "duplicate riddle: {}", a),
            Self::InsertCollision(a) => write!(f, "content hash taken at insert: {}", a),
        }
    }
}

/// Raw object the model is asked to emit
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Pull the first riddle-shaped JSON object out of a completion
pub fn parse_candidate(text: &str) -> Option<Candidate> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let found = CANDIDATE_RE.find(cleaned.trim())?;
    serde_json::from_str(found.as_str()).ok()
}

#[derive(Clone)]
pub struct Generator {
    store: Arc<dyn ContentStore>,
    backend: Arc<dyn LlmBackend>,
}

impl Generator {
    pub fn new(store: Arc<dyn ContentStore>, backend: Arc<dyn LlmBackend>) -> Self {
        Self { store, backend }
    }

    /// Generate and persist one unique English riddle in `category`.
    ///
    /// `Ok(None)` when every attempt was rejected.
    pub async fn generate(&self, category: &str) -> Result<Option<RiddleDoc>> {
        let mut state = GenerationState::Idle.after_rejection();
        let mut accepted = None;

        while let GenerationState::Attempting(n) = state {
            match self.attempt(category).await? {
                Ok(riddle) => {
                    info!(
                        attempt = n,
                        answer = %riddle.answer,
                        category = %riddle.category,
                        "Generated unique riddle"
                    );
                    accepted = Some(riddle);
                    state = GenerationState::Accepted;
                }
                Err(rejection) => {
                    warn!(attempt = n, "Generation attempt rejected: {}", rejection);
                    state = state.after_rejection();
                }
            }
        }

        if state == GenerationState::Exhausted {
            warn!(
                category,
                "Failed to generate a unique riddle after {} attempts", MAX_GENERATION_ATTEMPTS
            );
        }
        Ok(accepted)
    }

    /// One completion call plus validation and insert
    async fn attempt(&self, category: &str) -> Result<std::result::Result<RiddleDoc, Rejection>> {
        let recent = self
            .store
            .recent_answers(GENERATION_LANGUAGE, RECENT_ANSWER_WINDOW)
            .await?;
        let avoid = prompts::avoid_terms(&recent);
        let request = prompts::build_request(&mut rand::thread_rng(), category, &avoid);

        let response = match self.backend.complete(request).await {
            Ok(response) => response,
            Err(e) => return Ok(Err(Rejection::Provider(e))),
        };
        debug!(backend = self.backend.id(), "Completion received");

        let Some(candidate) = parse_candidate(&response.content) else {
            return Ok(Err(Rejection::Unparseable));
        };

        let answer = normalize(&candidate.answer);
        let question = candidate.question.trim().to_string();

        if answer.is_empty() || question.is_empty() {
            return Ok(Err(Rejection::EmptyAnswer));
        }
        if answer.split_whitespace().count() > 1 {
            return Ok(Err(Rejection::MultiWordAnswer(answer)));
        }
        if prompts::is_blocklisted(&answer) {
            return Ok(Err(Rejection::Blocklisted(answer)));
        }

        let hash = content_hash(&question, &answer);
        if self
            .store
            .answer_or_hash_exists(GENERATION_LANGUAGE, &answer, &hash)
            .await?
        {
            return Ok(Err(Rejection::Duplicate(answer)));
        }

        let difficulty = candidate
            .difficulty
            .as_deref()
            .map(|label| Difficulty::parse(label).unwrap_or(Difficulty::Unrated))
            .unwrap_or_default();

        let riddle = RiddleDoc::new(
            question,
            answer,
            hash,
            category.to_string(),
            difficulty,
            GENERATION_LANGUAGE.to_string(),
            SOURCE_GENERATED,
        );

        if !self.store.insert_riddle(riddle.clone()).await? {
            return Ok(Err(Rejection::InsertCollision(riddle.answer)));
        }
        Ok(Ok(riddle))
    }
}
