//! Thread query functions

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{InquiryThread, Message, SenderRole, ThreadId, ThreadStatus, UserId};
use crate::storage::InquiryStore;

/// Summary information for displaying a thread in an inbox list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    /// Thread ID
    pub id: ThreadId,
    /// The user who opened the inquiry
    pub owner_user_id: UserId,
    /// Subject line
    pub subject: String,
    /// Lifecycle status
    pub status: ThreadStatus,
    /// Timestamp of the most recent message
    pub last_message_at: DateTime<Utc>,
    /// Number of messages in the thread
    pub message_count: usize,
    /// Unread messages from the other side, relative to the viewer the
    /// list was built for
    pub unread_count: usize,
}

/// Detailed thread information including all messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadDetail {
    /// The thread metadata
    pub thread: InquiryThread,
    /// All messages in the thread, ordered chronologically
    pub messages: Vec<Message>,
}

fn summarize(
    store: &dyn InquiryStore,
    thread: InquiryThread,
    viewer: SenderRole,
) -> Result<ThreadSummary> {
    let message_count = store.count_messages_in_thread(&thread.id)?;
    let unread_count = store.unread_count_in_thread(&thread.id, viewer.opposite())?;

    Ok(ThreadSummary {
        id: thread.id,
        owner_user_id: thread.owner_user_id,
        subject: thread.subject,
        status: thread.status,
        last_message_at: thread.last_message_at,
        message_count,
        unread_count,
    })
}

/// List the admin inbox: every OPEN thread, newest activity first.
///
/// Unread counts are relative to the admin side (user-sent messages).
pub fn list_inquiries_for_admin(store: &dyn InquiryStore) -> Result<Vec<ThreadSummary>> {
    store
        .list_open_threads()?
        .into_iter()
        .map(|thread| summarize(store, thread, SenderRole::Admin))
        .collect()
}

/// List a user's inquiries: every thread they own, any status, newest
/// activity first.
///
/// Unread counts are relative to the user side (admin-sent messages).
pub fn list_inquiries_for_user(
    store: &dyn InquiryStore,
    user_id: &UserId,
) -> Result<Vec<ThreadSummary>> {
    store
        .list_threads_for_owner(user_id)?
        .into_iter()
        .map(|thread| summarize(store, thread, SenderRole::User))
        .collect()
}

/// Get detailed thread information including all messages
///
/// # Arguments
/// * `store` - The storage backend
/// * `thread_id` - The thread to fetch
pub fn get_thread_detail(
    store: &dyn InquiryStore,
    thread_id: &ThreadId,
) -> Result<Option<ThreadDetail>> {
    let thread = match store.get_thread(thread_id)? {
        Some(t) => t,
        None => return Ok(None),
    };

    let messages = store.list_messages_for_thread(thread_id)?;

    Ok(Some(ThreadDetail { thread, messages }))
}
