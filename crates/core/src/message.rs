//! Conversation transcript types.
//!
//! Everything the agent does is recorded here: the user's question, the
//! assistant's turns (with any tool calls), and the tool observations
//! feeding the next turn. Providers serialize these onto the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one conversation, i.e. one user turn's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a given message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing
    User,
    /// The model
    Assistant,
    /// Instructions injected at the front of the transcript (at most one)
    System,
    /// Output of an executed tool
    Tool,
}

/// One entry in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Stable per-message ID
    pub id: String,

    /// Author
    pub role: Role,

    /// Text body (may be empty on tool-call turns)
    pub content: String,

    /// Tool invocations the assistant requested this turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// For `Role::Tool` messages, the call this observation answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn of(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// A message typed by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::of(Role::User, content)
    }

    /// A plain assistant reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::of(Role::Assistant, content)
    }

    /// The system-instruction message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::of(Role::System, content)
    }

    /// A tool observation, linked back to the call that produced it.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::of(Role::Tool, content)
        }
    }

    /// True when this message is displayable answer text: non-blank
    /// content and no tool calls still waiting on execution.
    pub fn has_text_content(&self) -> bool {
        !self.content.trim().is_empty() && self.tool_calls.is_empty()
    }
}

/// A single tool invocation requested by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Provider-assigned call ID
    pub id: String,

    /// Which tool to run
    pub name: String,

    /// Raw JSON argument string, exactly as the model produced it
    pub arguments: String,
}

/// An append-only, ordered transcript.
///
/// One agent run owns one `Conversation`; runs never share a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Transcript ID
    pub id: ConversationId,

    /// Messages in arrival order
    pub messages: Vec<Message>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Time of the latest push
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// An empty transcript with a fresh ID.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, bumping `updated_at`.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Does the transcript already carry a system message?
    pub fn has_system(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::System)
    }

    /// Walk backwards to the newest message with displayable text,
    /// skipping blank turns and pending tool-call turns. This is the
    /// answer fallback when a run ends without usable assistant text.
    pub fn last_text_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.has_text_content())
            .map(|m| m.content.as_str())
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
