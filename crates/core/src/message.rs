//! Message (turn) domain types.
//!
//! A [`Message`] is one role-tagged unit of a conversation. User and
//! assistant messages make up the history window; system messages only
//! appear in a rendered request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (persona, rules)
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation.
///
/// Fields are private so a message cannot change after it is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with an explicit role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Unique message ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Who sent this message.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text content (may be empty).
    pub fn content(&self) -> &str {
        &self.content
    }

    /// When the message was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Two messages are equal when they carry the same role and text.
///
/// Ids and timestamps are bookkeeping and do not take part in comparison,
/// so history snapshots can be compared by conversational content.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.role == other.role && self.content == other.content
    }
}

impl Eq for Message {}
