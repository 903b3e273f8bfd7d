//! Message model representing one entry in an inquiry thread

use super::ThreadId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which side of the conversation sent a message
///
/// A message's read flag is meaningful only to the opposite role:
/// user-sent messages count toward the admin's unread total and
/// vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    User,
    Admin,
}

/// Error parsing a persisted sender role value
#[derive(Debug, Error)]
#[error("unrecognized sender role: {0:?}")]
pub struct ParseSenderRoleError(pub String);

impl SenderRole {
    /// The role on the other side of the conversation
    pub fn opposite(&self) -> Self {
        match self {
            Self::User => Self::Admin,
            Self::Admin => Self::User,
        }
    }

    /// Stable string form used in persisted columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for SenderRole {
    type Err = ParseSenderRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ParseSenderRoleError(other.to_string())),
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message within an inquiry thread
///
/// `is_read` starts false and only ever flips to true, through the
/// read-state engine's bulk update. Nothing flips it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: MessageId,
    /// ID of the thread this message belongs to
    pub thread_id: ThreadId,
    /// Which side sent it
    pub sender_role: SenderRole,
    /// Message text
    pub body: String,
    /// Whether the opposite role has seen this message
    pub is_read: bool,
    /// When the message was sent
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message builder
    pub fn builder(id: MessageId, thread_id: ThreadId) -> MessageBuilder {
        MessageBuilder::new(id, thread_id)
    }
}

/// Builder for creating Message instances
pub struct MessageBuilder {
    id: MessageId,
    thread_id: ThreadId,
    sender_role: SenderRole,
    body: String,
    is_read: bool,
    created_at: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    fn new(id: MessageId, thread_id: ThreadId) -> Self {
        Self {
            id,
            thread_id,
            sender_role: SenderRole::User,
            body: String::new(),
            is_read: false,
            created_at: None,
        }
    }

    pub fn sender_role(mut self, sender_role: SenderRole) -> Self {
        self.sender_role = sender_role;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn build(self) -> Message {
        Message {
            id: self.id,
            thread_id: self.thread_id,
            sender_role: self.sender_role,
            body: self.body,
            is_read: self.is_read,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_role() {
        assert_eq!(SenderRole::User.opposite(), SenderRole::Admin);
        assert_eq!(SenderRole::Admin.opposite(), SenderRole::User);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [SenderRole::User, SenderRole::Admin] {
            assert_eq!(role.as_str().parse::<SenderRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert!("moderator".parse::<SenderRole>().is_err());
    }

    #[test]
    fn test_builder_defaults_unread() {
        let msg = Message::builder(MessageId::new("m1"), ThreadId::new("t1"))
            .sender_role(SenderRole::Admin)
            .body("We have the 14th free.")
            .build();
        assert!(!msg.is_read);
        assert_eq!(msg.sender_role, SenderRole::Admin);
    }
}
