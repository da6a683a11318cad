//! LLM backend abstraction.
//!
//! The agent loop never talks HTTP itself. It hands a [`ProviderRequest`]
//! to something implementing [`Provider`] and receives one assistant
//! message back, which may carry structured tool calls.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything a backend needs for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Model identifier, e.g. "meta-llama/llama-3.1-8b-instruct"
    pub model: String,

    /// Full transcript so far
    pub messages: Vec<Message>,

    /// Sampling temperature; 0.0 keeps runs reproducible
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Generation cap, when the config sets one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the model may call this turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

fn default_temperature() -> f32 {
    0.0
}

/// Advertises one callable tool to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,

    /// What it does, in model-facing prose
    pub description: String,

    /// JSON Schema for its arguments
    pub parameters: serde_json::Value,
}

/// One completed backend round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The assistant message produced
    pub message: Message,

    /// Token accounting, when the backend reports it
    pub usage: Option<Usage>,

    /// Model that actually answered (gateways may substitute)
    pub model: String,
}

/// Token counts for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Backend contract: transcript in, assistant message out.
///
/// Implementations own their wire format and map it onto the domain
/// types above. Callers see none of it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name for logs, e.g. "openrouter".
    fn name(&self) -> &str;

    /// Run one completion to the end.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError>;
}
