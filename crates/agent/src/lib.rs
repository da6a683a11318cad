//! The core agent loop — the heart of InfoAgent.
//!
//! The agent follows a **Reason → Act → Observe** cycle:
//!
//! 1. **Receive** a user message
//! 2. **Send to LLM** via the configured provider (system prompt first)
//! 3. **If tool calls**: execute tools, append results, loop back to step 2
//! 4. **If text response**: stop
//! 5. **Sanitize** the chosen answer text and return it
//!
//! The loop continues until the LLM responds with text only (no tool calls)
//! or the iteration cap is reached. Whatever text the loop ends on passes
//! through the [`sanitizer::ResponseSanitizer`] before the user sees it.

pub mod loop_runner;
pub mod sanitizer;

pub use loop_runner::{AgentLoop, DEFAULT_MAX_ITERATIONS, SYSTEM_PROMPT};
pub use sanitizer::ResponseSanitizer;
