//! Riddler Agent - provider backends for the riddle service
//!
//! Provides the two outsourced collaborators of the riddle engine:
//! - Trait-based LLM backends for riddle generation (OpenAI-compatible, mock)
//! - Trait-based translators for non-English delivery (LibreTranslate, mock)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         riddler freshness engine        │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ LlmBackend  │       │ Translator  │
//! │ (OpenAI/    │       │ (Libre/     │
//! │  Groq/Mock) │       │  Mock)      │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod translate;

pub use backend::traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmBackend, LlmError, Message,
    MessageRole, Usage,
};
pub use backend::{MockBackend, OpenAiBackend};
pub use translate::{LibreTranslator, MockTranslator, TranslateError, Translator};
