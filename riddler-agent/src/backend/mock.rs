//! Mock LLM backend for testing and offline development.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;

use super::traits::*;

/// One scripted outcome for a `complete` call.
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// Mock backend for testing.
///
/// Replies are consumed in order; once the script runs out the fallback
/// response (if any) is returned on every call.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    script: Mutex<VecDeque<Scripted>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
    call_count: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend with an empty script.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.fallback = Some(content.into());
        self
    }

    /// Queue a reply.
    pub fn then_reply(mut self, content: impl Into<String>) -> Self {
        self.script.get_mut().push_back(Scripted::Reply(content.into()));
        self
    }

    /// Queue a failure.
    pub fn then_fail(mut self, reason: impl Into<String>) -> Self {
        self.script.get_mut().push_back(Scripted::Fail(reason.into()));
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Get the number of times complete was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// User text of every prompt received, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(request.user_text());

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock backend disabled".to_string()));
        }

        let next = self.script.lock().await.pop_front();
        let content = match next {
            Some(Scripted::Reply(content)) => content,
            Some(Scripted::Fail(reason)) => return Err(LlmError::RequestFailed(reason)),
            None => match &self.fallback {
                Some(content) => content.clone(),
                None => {
                    return Err(LlmError::Unavailable("Mock script exhausted".to_string()))
                }
            },
        };

        let prompt_tokens = request.user_text().len() as u32 / 4;
        let completion_tokens = content.len() as u32 / 4;

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}
