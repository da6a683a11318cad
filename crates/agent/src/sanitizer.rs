//! Response sanitizer — repairs free-form model output into a clean
//! final answer.
//!
//! Small instruction-following models leak artifacts into their text:
//! raw tool-call JSON, markdown fences, HTML tags, reasoning preambles.
//! The sanitizer runs a fixed, ordered pipeline of repairs:
//!
//! 1. Detect leaked tool-call JSON and execute the tool directly
//! 2. Strip markdown code fences and inline backticks
//! 3. Strip raw HTML / XML tags
//! 4. If a "Final Answer" marker exists, keep only what follows the
//!    last one
//! 5. Otherwise strip a leading Thoughts / Reasoning block
//! 6. Drop any remaining "Thoughts:" header lines
//!
//! Later stages assume earlier ones already ran (final-answer extraction
//! sees fence-stripped text), so the order is part of the contract.

use infoagent_core::error::ToolError;
use infoagent_core::tool::{ToolCall, ToolRegistry};
use regex_lite::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Placeholder answer when nothing displayable survives the pipeline.
const NO_RESPONSE: &str = "(No response)";

pub struct ResponseSanitizer {
    /// Used by the leaked-tool-call recovery path; the same registry the
    /// agent loop dispatches through.
    tools: Arc<ToolRegistry>,

    fence_open: Regex,
    fence_close: Regex,
    inline_code: Regex,
    html_tag: Regex,
    final_answer: Regex,
    reasoning_block: Regex,
    reasoning_line: Regex,
}

impl ResponseSanitizer {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            fence_open: Regex::new(r"```[\w]*\n?").expect("valid regex"),
            fence_close: Regex::new(r"```").expect("valid regex"),
            inline_code: Regex::new(r"`([^`]*)`").expect("valid regex"),
            html_tag: Regex::new(r"<[^>]+>").expect("valid regex"),
            final_answer: Regex::new(r"(?i)\*{0,2}final\s+answer\*{0,2}\s*:?\s*")
                .expect("valid regex"),
            reasoning_block: Regex::new(
                r"(?is)^(thoughts?|reasoning|thinking|chain.of.thought)\s*:.*?(\n\n|\z)",
            )
            .expect("valid regex"),
            reasoning_line: Regex::new(r"(?i)^\s*(thoughts?|reasoning)\s*:").expect("valid regex"),
        }
    }

    /// Run the full pipeline over raw model output.
    ///
    /// Always returns displayable text; when everything is stripped away
    /// the result is the fixed `"(No response)"` placeholder.
    pub async fn sanitize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return NO_RESPONSE.into();
        }

        let text = raw.trim();

        if let Some(output) = self.try_recover_tool_call(text).await {
            return output;
        }

        let text = self.strip_fences(text);
        let text = self.strip_inline_code(&text);
        let text = self.strip_html_tags(&text);
        let text = text.trim();

        if let Some(answer) = self.extract_final_answer(text) {
            if answer.is_empty() {
                return NO_RESPONSE.into();
            }
            return answer;
        }

        let text = self.strip_reasoning(text);
        if text.is_empty() {
            NO_RESPONSE.into()
        } else {
            text
        }
    }

    /// Detect raw tool-call JSON leaked into content and execute the tool.
    ///
    /// Handles both argument key spellings the models produce:
    /// `{"name": "calculator", "parameters": {"expression": "2+2"}}` and
    /// `{"name": "calculator", "arguments": {"expression": "2+2"}}`.
    /// Returns `None` when the text is not a tool-call object, so the
    /// normal cleaning steps run instead.
    async fn try_recover_tool_call(&self, text: &str) -> Option<String> {
        // Strip any surrounding code fences before trying the JSON parse
        let candidate = self.strip_fences(text);
        let candidate = candidate.trim();

        let Ok(Value::Object(parsed)) = serde_json::from_str::<Value>(candidate) else {
            return None;
        };
        let name_value = parsed.get("name")?;

        let arguments = parsed
            .get("parameters")
            .or_else(|| parsed.get("arguments"))
            .or_else(|| parsed.get("input"))
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        if !arguments.is_object() {
            return None;
        }

        let name = match name_value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        warn!(tool = %name, "Raw tool-call JSON leaked into content, executing directly");

        let call = ToolCall {
            id: String::new(),
            name,
            arguments,
        };
        Some(match self.tools.execute(&call).await {
            Ok(result) => result.output,
            Err(ToolError::NotFound(name)) => format!("(Unknown tool: {name})"),
            Err(e) => format!("(Tool execution error: {e})"),
        })
    }

    /// Remove markdown code fences (```lang ... ``` or bare ```).
    fn strip_fences(&self, text: &str) -> String {
        let text = self.fence_open.replace_all(text, "");
        self.fence_close.replace_all(&text, "").into_owned()
    }

    /// Unwrap inline backticks to plain text.
    fn strip_inline_code(&self, text: &str) -> String {
        self.inline_code.replace_all(text, "$1").into_owned()
    }

    /// Remove raw HTML / XML tags.
    fn strip_html_tags(&self, text: &str) -> String {
        self.html_tag.replace_all(text, "").into_owned()
    }

    /// Everything after the *last* "Final Answer" marker, if one exists.
    /// Handles "Final Answer:", "**Final Answer**", "**Final Answer:**".
    fn extract_final_answer(&self, text: &str) -> Option<String> {
        let last = self.final_answer.find_iter(text).last()?;
        let answer = text[last.end()..].trim();
        Some(answer.trim_start_matches('*').trim().to_string())
    }

    /// Strip a leading Thoughts / Reasoning block, then drop any remaining
    /// isolated "Thoughts:" header lines.
    fn strip_reasoning(&self, text: &str) -> String {
        let text = self.reasoning_block.replace(text, "");
        let text = text.trim();

        let lines: Vec<&str> = text
            .lines()
            .filter(|line| !self.reasoning_line.is_match(line))
            .collect();
        lines.join("\n").trim().to_string()
    }
}
