//! Tool trait, registry and per-agent tool scoping

use crate::error::{Error, Result};
use crate::openai::ToolDefinition;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Output from a tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Text handed back to the model
    pub content: String,
    /// Structured form of the same result, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolOutput {
    /// Create a plain text output
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            data: None,
        }
    }

    /// Create an output from a list of records; content is the JSON rendering
    pub fn records<T: Serialize>(records: &[T]) -> Result<Self> {
        let data = serde_json::to_value(records)?;
        Ok(Self {
            content: data.to_string(),
            data: Some(data),
        })
    }
}

/// A deterministic capability an agent may call while reasoning.
///
/// Implementations must be pure functions of their arguments: no I/O and no
/// interior mutability, so one instance can serve concurrent requests.
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool
    fn name(&self) -> &str;

    /// Description for LLM function calling
    fn description(&self) -> &str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(&self, params: &Value) -> Result<ToolOutput>;

    /// Function definition advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.input_schema())
    }
}

/// JSON Schema of an argument struct, for [`Tool::input_schema`]
pub fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// Deserialize tool arguments, reporting failures against the tool name
pub fn parse_args<T: DeserializeOwned>(tool: &str, params: &Value) -> Result<T> {
    serde_json::from_value(params.clone())
        .map_err(|e| Error::invalid_input(format!("{}: {}", tool, e)))
}

/// Name-indexed set of tools shared by every agent
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Look a tool up by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Registered tool names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name
    pub fn invoke(&self, name: &str, args: &Value) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        debug!(tool = name, "invoking tool");
        tool.execute(args)
    }

    /// Function definitions for the given names; unknown names are an error
    pub fn definitions<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<ToolDefinition>> {
        names
            .into_iter()
            .map(|name| {
                self.get(name)
                    .map(|tool| tool.definition())
                    .ok_or_else(|| Error::ToolNotFound(name.to_string()))
            })
            .collect()
    }

    /// A view of this registry restricted to `allowed`
    pub fn scoped<I, S>(self: &Arc<Self>, allowed: I) -> ToolSet
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ToolSet {
            registry: Arc::clone(self),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The tools one agent may call
#[derive(Clone, Debug)]
pub struct ToolSet {
    registry: Arc<ToolRegistry>,
    allowed: BTreeSet<String>,
}

impl ToolSet {
    /// A tool set that allows nothing
    pub fn empty() -> Self {
        Self {
            registry: Arc::new(ToolRegistry::new()),
            allowed: BTreeSet::new(),
        }
    }

    /// Allowed tool names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    /// Whether the set allows nothing
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether `name` may be called through this set
    pub fn allows(&self, name: &str) -> bool {
        self.allowed.contains(name)
    }

    /// Function definitions for every allowed tool
    pub fn definitions(&self) -> Result<Vec<ToolDefinition>> {
        self.registry.definitions(self.names())
    }

    /// Invoke an allowed tool; anything outside the set is `ToolNotFound`
    pub fn invoke(&self, name: &str, args: &Value) -> Result<ToolOutput> {
        if !self.allows(name) {
            return Err(Error::ToolNotFound(name.to_string()));
        }
        self.registry.invoke(name, args)
    }
}
