//! LLM provider implementations for InfoAgent.
//!
//! All providers implement the `infoagent_core::Provider` trait. The CLI
//! wraps the HTTP provider in `RetryProvider` so transient failures are
//! absorbed before they reach the agent loop.

pub mod openai_compat;
pub mod retry;

pub use openai_compat::OpenAiCompatProvider;
pub use retry::RetryProvider;
