//! # Voyage
//!
//! A multi-agent travel assistant served over HTTP.
//!
//! A query first passes the input guardrails (a check agent that rejects
//! math-homework requests). It then reaches the **Travel Planner**, which
//! either answers with a travel plan or hands off once to the **Flight
//! Specialist** or the **Hotel Specialist**. Whoever answers last produces a
//! structured output that is wrapped in a [`ResponseEnvelope`].
//!
//! Agents run through a [`CompletionProvider`]. The production provider talks
//! to any OpenAI-compatible chat-completions endpoint; tests use
//! [`testing::ScriptedProvider`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voyage::prelude::*;
//! use voyage::{roster, travel_tools};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ProviderConfig::from_env()?;
//!     let client = Arc::new(OpenAiClient::new(config.clone())?);
//!     let provider: Arc<dyn CompletionProvider> =
//!         Arc::new(ChatCompletionProvider::from_config(client, &config));
//!
//!     let planner = roster::travel_planner(vec![roster::math_guardrail(provider.clone())?])?;
//!     let router = Router::new(planner, provider, Arc::new(travel_tools::travel_registry()));
//!     let service = TravelService::for_router(router);
//!
//!     let envelope = service.handle("Find me a hotel in Paris under $300").await?;
//!     println!("{}", serde_json::to_string_pretty(&envelope)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod config;
pub mod envelope;
pub mod error;
pub mod guardrails;
pub mod handoffs;
pub mod llm_client;
pub mod openai;
pub mod outputs;
pub mod provider;
pub mod retry;
pub mod roster;
pub mod router;
pub mod server;
pub mod service;
pub mod testing;
pub mod tools;
pub mod tracing_ext;
pub mod travel_tools;
pub mod types;

// Re-exports for convenience
pub use agent::{AgentProfile, AgentSpec, AgentSpecBuilder};
pub use config::{AppConfig, LogFormat, ModelConfig, ProviderConfig, ServerConfig};
pub use envelope::{Payload, ResponseEnvelope, ResponseKind};
pub use error::{Error, Result};
pub use guardrails::{AgentGuardrail, GuardrailStage, GuardrailState, GuardrailVerdict, InputGuardrail};
pub use handoffs::{Handoff, HandoffContext, HandoffTarget};
pub use llm_client::LlmClient;
pub use openai::{CompletionRequest, CompletionResponse, Message, OpenAiClient};
pub use outputs::{
    FlightRecommendation, HotelRecommendation, MathHomeworkOutput, OutputSchema, StructuredOutput,
    TravelPlan,
};
pub use provider::{ChatCompletionProvider, Completion, CompletionProvider, CompletionTask};
pub use retry::{RetryConfig, RetryPolicy};
pub use router::{RouteOutcome, Router};
pub use service::TravelService;
pub use tools::{Tool, ToolOutput, ToolRegistry, ToolSet};
pub use types::{RequestId, TokenUsage};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::AgentSpec;
    pub use crate::config::{ModelConfig, ProviderConfig};
    pub use crate::error::{Error, Result};
    pub use crate::openai::OpenAiClient;
    pub use crate::provider::{ChatCompletionProvider, CompletionProvider};
    pub use crate::router::Router;
    pub use crate::service::TravelService;
    pub use crate::tools::{Tool, ToolRegistry};
}
