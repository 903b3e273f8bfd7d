//! Storage trait definitions

use crate::models::{
    InquiryThread, Message, MessageId, Notification, NotificationId, SenderRole, ThreadId,
    ThreadStatus, UserId,
};
use anyhow::Result;

/// Trait for inquiry storage operations
///
/// This trait abstracts over different storage backends (in-memory,
/// SQLite) and provides the create/read/update/filter operations the
/// read-state subsystem needs. It is injected into the engine and query
/// layers rather than held as process-wide state, so tests can swap in
/// the in-memory implementation.
pub trait InquiryStore: Send + Sync {
    /// Insert or update a thread
    fn upsert_thread(&self, thread: InquiryThread) -> Result<()>;

    /// Get a thread by ID
    fn get_thread(&self, id: &ThreadId) -> Result<Option<InquiryThread>>;

    /// Check if a thread exists
    fn has_thread(&self, id: &ThreadId) -> Result<bool>;

    /// Set a thread's lifecycle status; no-op for an unknown ID
    fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<()>;

    /// List OPEN threads (the admin-visible set), newest activity first
    fn list_open_threads(&self) -> Result<Vec<InquiryThread>>;

    /// List threads owned by a user, any status, newest activity first
    fn list_threads_for_owner(&self, owner: &UserId) -> Result<Vec<InquiryThread>>;

    /// Count total threads
    fn count_threads(&self) -> Result<usize>;

    /// Insert or update a message
    fn upsert_message(&self, message: Message) -> Result<()>;

    /// Get a message by ID
    fn get_message(&self, id: &MessageId) -> Result<Option<Message>>;

    /// List messages for a thread, ordered by created_at ascending
    fn list_messages_for_thread(&self, thread_id: &ThreadId) -> Result<Vec<Message>>;

    /// Count messages in a thread
    fn count_messages_in_thread(&self, thread_id: &ThreadId) -> Result<usize>;

    /// Count unread messages in a thread sent by the given role
    fn unread_count_in_thread(&self, thread_id: &ThreadId, sender_role: SenderRole)
    -> Result<usize>;

    /// Mark every unread message in a thread sent by the given role as read.
    ///
    /// Must be a single conditional bulk update (filter-then-update), never
    /// a per-message read-modify-write loop: concurrent duplicate calls have
    /// to converge on the same final state. Returns the number of messages
    /// actually flipped; an unknown thread ID yields 0, not an error.
    fn mark_messages_read(&self, thread_id: &ThreadId, sender_role: SenderRole) -> Result<usize>;

    /// Insert or update a notification
    fn upsert_notification(&self, notification: Notification) -> Result<()>;

    /// Get a notification by ID
    fn get_notification(&self, id: &NotificationId) -> Result<Option<Notification>>;

    /// Mark a single notification as read.
    ///
    /// Returns the notification after the flip, or `None` for an unknown
    /// ID. Already-read notifications are returned unchanged.
    fn mark_notification_read(&self, id: &NotificationId) -> Result<Option<Notification>>;

    /// List notifications for a recipient, newest first
    fn list_notifications_for_user(&self, user: &UserId) -> Result<Vec<Notification>>;

    /// Count unread notifications for a recipient
    fn count_unread_notifications(&self, user: &UserId) -> Result<usize>;

    /// Clear all data (for testing)
    fn clear(&self) -> Result<()>;
}
