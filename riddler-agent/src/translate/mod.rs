//! Translation provider abstraction.
//!
//! Riddles are generated in English; non-English delivery translates the
//! accepted question and answer through a `Translator`.

pub mod libre;
pub mod mock;

use async_trait::async_trait;

pub use libre::LibreTranslator;
pub use mock::MockTranslator;

/// Error types for translation calls.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Language pair is not supported by the provider
    #[error("Unsupported language pair: {source_lang} -> {target_lang}")]
    Unsupported {
        source_lang: String,
        target_lang: String,
    },

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A single text-in/text-out translation call.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (ISO 639-1 codes).
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, TranslateError>;
}
