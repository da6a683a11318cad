//! # InfoAgent Core
//!
//! Domain types, traits, and errors shared by every InfoAgent crate.
//! Nothing here touches a network or a framework; the crate exists so
//! the rest of the workspace can depend inward on one small surface.
//!
//! The two seams to the outside world, the LLM backend and the tools,
//! are traits in this crate. Concrete implementations live in the
//! `providers` and `tools` crates, and tests swap in scripted stand-ins
//! behind the same traits.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Root re-exports, so callers rarely need the module paths
pub use error::{Error, Result};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolDispatch, ToolRegistry, ToolResult};
