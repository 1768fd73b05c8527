//! The completion capability agents run on
//!
//! [`CompletionProvider`] is the only suspension point in a request. The
//! production implementation, [`ChatCompletionProvider`], drives an
//! [`LlmClient`] through a tool-calling loop: tool calls are executed against
//! the task's [`ToolSet`] and fed back, a handoff call ends the run with
//! [`Completion::Handoff`], and plain content is parsed into the task's
//! output schema.

use crate::config::{ModelConfig, ProviderConfig};
use crate::error::{Error, Result};
use crate::handoffs::HandoffTarget;
use crate::llm_client::LlmClient;
use crate::openai::{CompletionRequest, Message, ToolCall};
use crate::outputs::{OutputSchema, StructuredOutput};
use crate::tools::ToolSet;
use crate::types::TokenUsage;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Everything a provider needs to run one agent on one input
#[derive(Debug, Clone)]
pub struct CompletionTask {
    /// Name of the agent being run
    pub agent: String,
    /// Role instructions (system prompt)
    pub instructions: String,
    /// Conversation input
    pub input: String,
    /// Tools the agent may call
    pub tools: ToolSet,
    /// Required shape of the final answer
    pub output: OutputSchema,
    /// Agents control may be transferred to
    pub handoffs: Vec<HandoffTarget>,
    /// Model override
    pub model: Option<ModelConfig>,
}

/// How an agent run ended
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The agent answered
    Final(StructuredOutput),
    /// The agent asked to transfer control
    Handoff {
        /// Name of the receiving agent
        target: String,
        /// Reason given by the model
        reason: String,
    },
}

/// Produces a structured result for a [`CompletionTask`]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run the task to completion or handoff
    async fn complete(&self, task: CompletionTask) -> Result<Completion>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// [`CompletionProvider`] backed by a chat-completions client
pub struct ChatCompletionProvider {
    client: Arc<dyn LlmClient>,
    model: ModelConfig,
    max_turns: u32,
}

impl ChatCompletionProvider {
    /// Create a provider using `model` unless a task overrides it
    pub fn new(client: Arc<dyn LlmClient>, model: ModelConfig) -> Self {
        Self {
            client,
            model,
            max_turns: 10,
        }
    }

    /// Create a provider with model and turn limit taken from `config`
    pub fn from_config(client: Arc<dyn LlmClient>, config: &ProviderConfig) -> Self {
        Self::new(client, config.model.clone()).with_max_turns(config.max_turns)
    }

    /// Set the maximum number of model round-trips per task
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    fn system_prompt(task: &CompletionTask) -> String {
        match task.output.json_schema() {
            Some(_) => format!(
                "{}\n\nWhen you give your final answer, respond only with a JSON object matching the {} schema.",
                task.instructions.trim(),
                task.output.name()
            ),
            None => task.instructions.trim().to_string(),
        }
    }

    fn run_tool(task: &CompletionTask, call: &ToolCall) -> Result<String> {
        let args: Value = if call.function.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                Error::invalid_input(format!("{}: malformed arguments: {}", call.function.name, e))
            })?
        };
        task.tools
            .invoke(&call.function.name, &args)
            .map(|output| output.content)
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionProvider {
    #[instrument(skip_all, fields(agent = %task.agent))]
    async fn complete(&self, task: CompletionTask) -> Result<Completion> {
        let model = task.model.clone().unwrap_or_else(|| self.model.clone());
        let mut definitions = task.tools.definitions()?;
        definitions.extend(task.handoffs.iter().map(HandoffTarget::definition));

        let mut messages = vec![
            Message::system(Self::system_prompt(&task)),
            Message::user(&task.input),
        ];
        let mut usage = TokenUsage::default();

        for turn in 0..self.max_turns {
            let request = CompletionRequest::new(&model.model, messages.clone())
                .with_temperature(model.temperature)
                .with_max_tokens(model.max_tokens)
                .with_tools(definitions.clone())
                .with_response_format(task.output.response_format());

            let response = self.client.complete(request).await?;
            usage.add(response.usage.clone().into());
            let message = response.first_message()?.clone();

            let calls = message.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                debug!(turn, total_tokens = usage.total_tokens, "agent produced final answer");
                return Ok(Completion::Final(task.output.parse(message.text())));
            }

            if let Some((target, call)) = calls.iter().find_map(|call| {
                task.handoffs
                    .iter()
                    .find(|h| h.tool_name == call.function.name)
                    .map(|h| (h, call))
            }) {
                let reason = serde_json::from_str::<Value>(&call.function.arguments)
                    .ok()
                    .and_then(|v| v.get("reason").and_then(Value::as_str).map(String::from))
                    .unwrap_or_default();
                let skipped: Vec<&str> = calls
                    .iter()
                    .filter(|other| !std::ptr::eq(*other, call))
                    .map(|other| other.function.name.as_str())
                    .collect();
                if !skipped.is_empty() {
                    debug!(?skipped, "ignoring tool calls made alongside handoff");
                }
                info!(target_agent = %target.agent, "agent requested handoff");
                return Ok(Completion::Handoff {
                    target: target.agent.clone(),
                    reason,
                });
            }

            messages.push(Message::assistant_tool_calls(calls.clone()));
            for call in &calls {
                let content = match Self::run_tool(&task, call) {
                    Ok(content) => content,
                    // The model can recover from bad arguments; unknown tools are fatal
                    Err(Error::InvalidInput(message)) => {
                        warn!(tool = %call.function.name, %message, "tool call rejected");
                        format!("Error: {}", message)
                    }
                    Err(other) => return Err(other),
                };
                debug!(tool = %call.function.name, "tool call completed");
                messages.push(Message::tool(content, &call.id));
            }
        }

        Err(Error::MaxTurnsExceeded(self.max_turns))
    }

    fn name(&self) -> &str {
        self.client.client_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::{Choice, CompletionResponse, Usage};
    use crate::tools::ToolRegistry;
    use crate::travel_tools::{travel_registry, HOTEL_TOOL, WEATHER_TOOL};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned chat messages and keeps every request it saw
    #[derive(Default)]
    struct ReplayClient {
        replies: Mutex<VecDeque<Message>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ReplayClient {
        fn new(replies: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ReplayClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.requests.lock().push(request);
            let message = self
                .replies
                .lock()
                .pop_front()
                .ok_or_else(|| Error::provider("no more replies"))?;
            Ok(CompletionResponse {
                id: "test".into(),
                model: "test".into(),
                choices: vec![Choice {
                    index: 0,
                    message,
                    finish_reason: None,
                }],
                usage: Usage::default(),
            })
        }

        fn client_type(&self) -> &str {
            "replay"
        }
    }

    fn task(tools: &[&str], output: OutputSchema, handoffs: Vec<HandoffTarget>) -> CompletionTask {
        let registry = Arc::new(travel_registry());
        CompletionTask {
            agent: "Tester".into(),
            instructions: "Be helpful.".into(),
            input: "Find me a hotel in Paris".into(),
            tools: registry.scoped(tools.iter().copied()),
            output,
            handoffs,
            model: None,
        }
    }

    fn provider(client: Arc<ReplayClient>) -> ChatCompletionProvider {
        ChatCompletionProvider::new(client, ModelConfig::new("test-model")).with_max_turns(3)
    }

    #[tokio::test]
    async fn test_tool_results_are_fed_back() {
        let client = ReplayClient::new(vec![
            Message::assistant_tool_calls(vec![ToolCall::function(
                "call_1",
                HOTEL_TOOL,
                r#"{"city":"Paris","check_in":"a","check_out":"b","max_price":300}"#,
            )]),
            Message::assistant(
                r#"{"name":"City Center Hotel","location":"Downtown","price_per_night":199.99,"amenities":["Pool"],"recommendation_reason":"pool"}"#,
            ),
        ]);

        let completion = provider(client.clone())
            .complete(task(&[HOTEL_TOOL], OutputSchema::Hotel, vec![]))
            .await
            .unwrap();

        assert!(matches!(completion, Completion::Final(StructuredOutput::Hotel(_))));
        let requests = client.requests.lock();
        assert_eq!(requests.len(), 2);
        let tool_message = requests[1].messages.last().unwrap();
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert!(!tool_message.text().contains("Luxury Palace"));
        assert!(requests[0].response_format.is_some());
    }

    #[tokio::test]
    async fn test_handoff_call_ends_the_run() {
        let target = HandoffTarget {
            agent: "Hotel Specialist".into(),
            tool_name: "transfer_to_hotel_specialist".into(),
            description: "Hotels".into(),
        };
        let client = ReplayClient::new(vec![Message::assistant_tool_calls(vec![ToolCall::function(
            "call_1",
            "transfer_to_hotel_specialist",
            r#"{"reason":"hotel request"}"#,
        )])]);

        let completion = provider(client.clone())
            .complete(task(&[WEATHER_TOOL], OutputSchema::TravelPlan, vec![target]))
            .await
            .unwrap();

        assert_eq!(
            completion,
            Completion::Handoff {
                target: "Hotel Specialist".into(),
                reason: "hotel request".into(),
            }
        );
        let advertised: Vec<_> = client.requests.lock()[0]
            .tools
            .clone()
            .unwrap()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(advertised, vec![WEATHER_TOOL.to_string(), "transfer_to_hotel_specialist".to_string()]);
    }

    #[tokio::test]
    async fn test_handoff_wins_over_sibling_tool_calls() {
        let target = HandoffTarget {
            agent: "Hotel Specialist".into(),
            tool_name: "transfer_to_hotel_specialist".into(),
            description: "Hotels".into(),
        };
        // search_hotels is out of scope here, so running it would fail the task
        let client = ReplayClient::new(vec![Message::assistant_tool_calls(vec![
            ToolCall::function(
                "call_1",
                HOTEL_TOOL,
                r#"{"city":"Paris","check_in":"a","check_out":"b"}"#,
            ),
            ToolCall::function(
                "call_2",
                "transfer_to_hotel_specialist",
                r#"{"reason":"hotel request"}"#,
            ),
        ])]);

        let completion = provider(client.clone())
            .complete(task(&[WEATHER_TOOL], OutputSchema::TravelPlan, vec![target]))
            .await
            .unwrap();

        assert!(matches!(completion, Completion::Handoff { ref target, .. } if target == "Hotel Specialist"));
        assert_eq!(client.requests.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_disallowed_tool_is_not_swallowed() {
        let client = ReplayClient::new(vec![Message::assistant_tool_calls(vec![ToolCall::function(
            "call_1",
            HOTEL_TOOL,
            r#"{"city":"Paris","check_in":"a","check_out":"b"}"#,
        )])]);

        let err = provider(client)
            .complete(task(&[WEATHER_TOOL], OutputSchema::TravelPlan, vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ToolNotFound(name) if name == HOTEL_TOOL));
    }

    #[tokio::test]
    async fn test_turn_limit() {
        let call = || {
            Message::assistant_tool_calls(vec![ToolCall::function(
                "c",
                WEATHER_TOOL,
                r#"{"city":"Paris","date":"today"}"#,
            )])
        };
        let client = ReplayClient::new(vec![call(), call(), call(), call()]);

        let err = provider(client)
            .complete(task(&[WEATHER_TOOL], OutputSchema::Text, vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MaxTurnsExceeded(3)));
    }

    #[tokio::test]
    async fn test_empty_registry_text_answer() {
        let client = ReplayClient::new(vec![Message::assistant("Why do programmers prefer recursion? Because...")]);
        let registry = Arc::new(ToolRegistry::new());
        let task = CompletionTask {
            agent: "Assistant".into(),
            instructions: "You are a helpful assistant".into(),
            input: "Write a joke about recursion in programming.".into(),
            tools: registry.scoped(Vec::<String>::new()),
            output: OutputSchema::Text,
            handoffs: vec![],
            model: Some(ModelConfig::new("override")),
        };

        let completion = provider(client.clone()).complete(task).await.unwrap();
        assert!(matches!(completion, Completion::Final(StructuredOutput::Text(_))));
        assert_eq!(client.requests.lock()[0].model, "override");
        assert!(client.requests.lock()[0].tools.is_none());
    }
}
