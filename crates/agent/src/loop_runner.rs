//! The reason-act-observe loop behind every conversation turn.

use crate::sanitizer::ResponseSanitizer;
use infoagent_core::error::ToolError;
use infoagent_core::message::{Conversation, Message, Role};
use infoagent_core::provider::{Provider, ProviderRequest};
use infoagent_core::tool::{ToolCall, ToolDispatch, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default cap on provider invocations per user turn.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// Instructions injected as the first message of every transcript.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful, accurate AI assistant with access to tools.

## Available Tools
- `calculator` — evaluate math expressions (e.g. '2 + 2', 'sqrt(144)')
- `weather_lookup` — get current weather for a city
- `web_search` — search for recent news, facts, or any web information

## How to respond
1. Carefully read the user's question.
2. If a tool would help, call it ONCE. Do NOT call multiple tools for the same question.
3. After receiving tool output, use it to write a clear, direct answer.
4. If no tool is needed, answer directly from your knowledge.

## Response format
Always end with a **Final Answer** section that directly addresses the user's question.
Keep answers concise and relevant — avoid unnecessary disclaimers.

## Rules
- Do not call a tool if you already have enough information.
- Do not speculate about tool results before calling them.
- If a tool returns an error, acknowledge it and answer as best you can.
- Never fabricate facts or data.
- NEVER wrap your response in HTML tags, div tags, code blocks, or markdown fences.
- Always respond in plain text only.";

/// Drives provider calls and tool execution for one conversation.
pub struct AgentLoop {
    /// Backend producing assistant turns
    provider: Arc<dyn Provider>,

    /// Model identifier sent on every request
    model: String,

    /// Sampling temperature for all requests
    temperature: f32,

    /// Optional cap on generated tokens
    max_tokens: Option<u32>,

    /// Capabilities available this run
    tools: Arc<ToolRegistry>,

    /// Maximum provider invocations per turn
    max_iterations: u32,

    /// Policy for assistant turns that request more than one tool call
    dispatch: ToolDispatch,

    /// Repairs the raw answer text before it reaches the user
    sanitizer: ResponseSanitizer,
}

impl AgentLoop {
    /// Wire a loop over a provider and a tool set.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let sanitizer = ResponseSanitizer::new(tools.clone());
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            dispatch: ToolDispatch::default(),
            sanitizer,
        }
    }

    /// Set the maximum number of provider invocations per turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Cap the tokens generated per response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the multi-tool-call dispatch policy.
    pub fn with_dispatch(mut self, dispatch: ToolDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Run one user turn to completion and return the answer text.
    ///
    /// Injects the system prompt if the transcript lacks one, then
    /// alternates provider calls with tool execution until the model
    /// answers in plain text or `max_iterations` round trips have
    /// completed, whichever comes first. A capped run that still wants
    /// tools has those calls dropped. The chosen answer text passes
    /// through the sanitizer before being returned.
    pub async fn process(
        &self,
        conversation: &mut Conversation,
    ) -> Result<String, infoagent_core::Error> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "Starting agent turn"
        );

        // The system prompt is injected lazily, on the first turn that
        // reaches the loop.
        if !conversation.has_system() {
            conversation.messages.insert(0, Message::system(SYSTEM_PROMPT));
        }

        let tool_definitions = self.tools.definitions();
        let mut iteration: u32 = 0;

        loop {
            debug!(
                conversation_id = %conversation.id,
                iteration,
                "Requesting completion"
            );

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
            };

            // Call the LLM. The counter increments only after a completed
            // invocation, so it always equals the number of round trips.
            let response = self.provider.complete(request).await?;
            iteration += 1;

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            if iteration >= self.max_iterations {
                if !tool_calls.is_empty() {
                    warn!(
                        conversation_id = %conversation.id,
                        iterations = iteration,
                        "Max iterations reached, dropping pending tool calls"
                    );
                }
                break;
            }

            if tool_calls.is_empty() {
                // Plain text turn, nothing left to execute.
                break;
            }

            debug!(
                tool_count = tool_calls.len(),
                dispatch = ?self.dispatch,
                "Dispatching tool calls"
            );

            let selected = match self.dispatch {
                ToolDispatch::All => &tool_calls[..],
                ToolDispatch::First => &tool_calls[..1],
            };

            for tc in selected {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments: serde_json::from_str(&tc.arguments).unwrap_or_default(),
                };

                match self.tools.execute(&call).await {
                    Ok(result) => {
                        debug!(tool = %tc.name, success = result.success, "Tool executed");
                        conversation.push(Message::tool_result(&tc.id, &result.output));
                    }
                    Err(ToolError::NotFound(name)) => {
                        // The model asked for a tool we don't have. Tell it
                        // and keep going; the next turn can recover.
                        warn!(tool = %name, "Unknown tool requested");
                        conversation
                            .push(Message::tool_result(&tc.id, format!("(Unknown tool: {name})")));
                    }
                    Err(e) => {
                        warn!(tool = %tc.name, error = %e, "Tool call failed");
                        conversation.push(Message::tool_result(
                            &tc.id,
                            format!("(Tool execution error: {e})"),
                        ));
                    }
                }
            }

            // The next turn sees the observations appended above.
        }

        // Answer selection: the last assistant message's content if it has
        // any text, otherwise the nearest earlier message with plain text
        // content, otherwise the fixed fallback.
        let raw_answer = match conversation.messages.last() {
            Some(last) if last.role == Role::Assistant && !last.content.trim().is_empty() => {
                last.content.clone()
            }
            _ => conversation
                .last_text_content()
                .unwrap_or("(No response)")
                .to_string(),
        };

        Ok(self.sanitizer.sanitize(&raw_answer).await)
    }
}
