/// Chat (conversation) model
///
/// A chat belongs to exactly one application user. Messages are kept inline
/// as a JSONB array in insertion order.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chats (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     messages JSONB NOT NULL DEFAULT '[]'::jsonb,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum title length derived from the first user message
pub const MAX_TITLE_CHARS: usize = 60;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Full chat including its messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,

    /// Owning application user
    pub user_id: Uuid,

    pub title: String,

    pub messages: Vec<ChatMessage>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn summary(&self) -> ChatSummary {
        ChatSummary {
            id: self.id,
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry for a chat (no messages)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Builds a chat title from the opening message
///
/// Whitespace is collapsed and the result is cut at [`MAX_TITLE_CHARS`]
/// characters with a trailing ellipsis. Blank input yields "New chat".
pub fn title_from_message(message: &str) -> String {
    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "New chat".to_string();
    }

    if collapsed.chars().count() <= MAX_TITLE_CHARS {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", truncated.trim_end())
    }
}
