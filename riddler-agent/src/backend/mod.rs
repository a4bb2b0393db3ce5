//! LLM Backend abstraction layer.
//!
//! Provides a trait-based interface for riddle generation backends:
//! - OpenAI-compatible (Groq, vLLM, Ollama, OpenAI, etc.)
//! - Scripted mock backend for testing and offline development

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use traits::{CompletionRequest, CompletionResponse, LlmBackend, LlmError};
