//! Tool abstraction and registry.
//!
//! A tool is a capability the model cannot provide on its own, like
//! arithmetic, live weather, or web search. Tools render every outcome
//! as display-ready text: a lookup that finds nothing still succeeds,
//! with the explanation in the output string.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tool invocation, with its arguments already parsed to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID, carried over from the model's tool_call.id
    pub id: String,

    /// Registered tool name
    pub name: String,

    /// Parsed argument object
    pub arguments: serde_json::Value,
}

/// What came back from running a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call this result answers
    pub call_id: String,

    /// Did the tool run to completion?
    pub success: bool,

    /// Human-readable output, also on failure
    pub output: String,
}

impl ToolResult {
    /// A success carrying `output`. The registry fills in `call_id`.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: true,
            output: output.into(),
        }
    }

    /// A failure whose `output` explains what went wrong.
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: false,
            output: output.into(),
        }
    }
}

/// How to handle a turn where the model asks for several tools at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolDispatch {
    /// Run every call, in the order the model listed them.
    #[default]
    All,

    /// Run only the first call; the rest are dropped.
    First,
}

/// Implemented by every agent capability.
///
/// The built-ins (calculator, weather_lookup, web_search) all live
/// behind this trait, registered in a [`ToolRegistry`] that the agent
/// loop consults each turn.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registered name, e.g. "calculator".
    fn name(&self) -> &str;

    /// One-or-two-sentence description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the arguments object.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Run the tool against the given argument object.
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Package name, description and schema for the provider request.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Name-keyed set of tools, assembled once at startup.
///
/// Both dispatch routes go through the same registry: the agent loop's
/// normal tool execution, and the sanitizer's leaked-tool-call recovery.
/// That keeps the two paths agreeing on which tools exist.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Add a tool under its own name, replacing any previous holder.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Definitions for every registered tool, for the provider request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Run one call, stamping its ID onto the result. An unregistered
    /// name comes back as [`ToolError::NotFound`] and the caller picks
    /// the rendering.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let Some(tool) = self.tools.get(&call.name) else {
            return Err(ToolError::NotFound(call.name.clone()));
        };
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// Names currently registered.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
