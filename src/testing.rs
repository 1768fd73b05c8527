//! Scripted completion provider for tests and offline runs
//!
//! [`ScriptedProvider`] plays back a queue of [`Step`]s per agent name.
//! Tool steps are executed for real through the task's tool set, so tool
//! scoping and `ToolNotFound` behave exactly as they do in production.

use crate::error::{Error, Result};
use crate::provider::{Completion, CompletionProvider, CompletionTask};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// One scripted move of an agent
#[derive(Debug, Clone)]
pub enum Step {
    /// Call a tool, then continue with the next step
    Tool {
        /// Tool name
        name: String,
        /// Tool arguments
        args: Value,
    },
    /// Answer with raw text, parsed against the task's output schema
    Finish(String),
    /// Hand off to another agent
    Handoff {
        /// Receiving agent
        target: String,
        /// Reason
        reason: String,
    },
    /// Fail as the provider would
    Fail(String),
}

impl Step {
    /// Call `name` with `args`
    pub fn tool(name: impl Into<String>, args: Value) -> Self {
        Self::Tool {
            name: name.into(),
            args,
        }
    }

    /// Final answer
    pub fn finish(raw: impl Into<String>) -> Self {
        Self::Finish(raw.into())
    }

    /// Final answer rendered from a serializable value
    pub fn finish_json<T: serde::Serialize>(value: &T) -> Self {
        Self::Finish(serde_json::to_string(value).unwrap_or_default())
    }

    /// Handoff to `target`
    pub fn handoff(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Handoff {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Provider failure
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

/// A tool call made while playing a script
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Agent that made the call
    pub agent: String,
    /// Tool called
    pub tool: String,
    /// Arguments passed
    pub args: Value,
    /// Structured result, if the tool produced one
    pub data: Option<Value>,
}

/// [`CompletionProvider`] that replays per-agent scripts
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<CompletionTask>>,
    invocations: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedProvider {
    /// Create a provider with no scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `steps` to the script of `agent`
    pub fn script(self, agent: impl Into<String>, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .entry(agent.into())
            .or_default()
            .extend(steps);
        self
    }

    /// Every task received, in order
    pub fn calls(&self) -> Vec<CompletionTask> {
        self.calls.lock().clone()
    }

    /// Number of tasks received for `agent`
    pub fn calls_for(&self, agent: &str) -> usize {
        self.calls.lock().iter().filter(|t| t.agent == agent).count()
    }

    /// Every tool call made, in order
    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().clone()
    }

    fn next_step(&self, agent: &str) -> Result<Step> {
        self.scripts
            .lock()
            .get_mut(agent)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| Error::provider(format!("no scripted reply left for agent '{}'", agent)))
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, task: CompletionTask) -> Result<Completion> {
        self.calls.lock().push(task.clone());
        loop {
            match self.next_step(&task.agent)? {
                Step::Tool { name, args } => {
                    let output = task.tools.invoke(&name, &args)?;
                    self.invocations.lock().push(ToolInvocation {
                        agent: task.agent.clone(),
                        tool: name,
                        args,
                        data: output.data,
                    });
                }
                Step::Finish(raw) => return Ok(Completion::Final(task.output.parse(&raw))),
                Step::Handoff { target, reason } => {
                    return Ok(Completion::Handoff { target, reason })
                }
                Step::Fail(message) => return Err(Error::provider(message)),
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
