//! Standalone notification model
//!
//! Notifications are independent of inquiry threads: one row per
//! recipient, with the same monotonic read-state rule as messages.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for NotificationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NotificationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A notification delivered to a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID
    pub id: NotificationId,
    /// The user this notification is addressed to
    pub recipient_user_id: UserId,
    /// Short headline shown in the notification list
    pub title: String,
    /// Notification text
    pub body: String,
    /// Free-form payload for the UI (deep link target, entity ids)
    #[serde(default)]
    pub data: serde_json::Value,
    /// Whether the recipient has seen this notification
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification
    pub fn new(
        id: NotificationId,
        recipient_user_id: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            recipient_user_id,
            title: title.into(),
            body: body.into(),
            data: serde_json::Value::Null,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Attach a payload to the notification
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(
            NotificationId::new("n1"),
            UserId::new("u1"),
            "Quote ready",
            "Your florist quote is ready to review.",
        );
        assert!(!n.is_read);
        assert!(n.data.is_null());
    }

    #[test]
    fn test_with_data() {
        let n = Notification::new(
            NotificationId::new("n1"),
            UserId::new("u1"),
            "Quote ready",
            "Your florist quote is ready to review.",
        )
        .with_data(json!({"quote_id": "q42"}));
        assert_eq!(n.data["quote_id"], "q42");
    }
}
