//! Inquiry thread model representing a user's conversation with the planning team

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for an inquiry thread
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a user account
///
/// Shared by thread ownership and notification delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle status of an inquiry thread
///
/// Open threads appear in the admin inbox; closed threads stay visible
/// to their owner only. Threads are never physically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Open,
    Closed,
}

/// Error parsing a persisted thread status value
#[derive(Debug, Error)]
#[error("unrecognized thread status: {0:?}")]
pub struct ParseThreadStatusError(pub String);

impl ThreadStatus {
    /// Stable string form used in persisted columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for ThreadStatus {
    type Err = ParseThreadStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(ParseThreadStatusError(other.to_string())),
        }
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inquiry thread: a conversation owned by exactly one user,
/// visible to all admins while open
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryThread {
    /// Thread ID
    pub id: ThreadId,
    /// The user who opened the inquiry
    pub owner_user_id: UserId,
    /// Subject line of the inquiry
    pub subject: String,
    /// Lifecycle status
    pub status: ThreadStatus,
    /// When the inquiry was opened
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent message in the thread
    pub last_message_at: DateTime<Utc>,
}

impl InquiryThread {
    /// Create a new open thread
    pub fn new(
        id: ThreadId,
        owner_user_id: UserId,
        subject: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_user_id,
            subject,
            status: ThreadStatus::Open,
            created_at,
            last_message_at: created_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ThreadStatus::Open
    }
}
