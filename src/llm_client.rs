//! Chat-level client trait for OpenAI-compatible endpoints

use crate::error::Result;
use crate::openai::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;

/// A client that can answer one chat-completions request
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the client type for debugging/logging
    fn client_type(&self) -> &str;
}
