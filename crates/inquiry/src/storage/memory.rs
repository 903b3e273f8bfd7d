//! In-memory storage implementation
//!
//! Used for tests and as the injectable fake behind the engine; the
//! production deployment uses the SQLite implementation.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::InquiryStore;
use crate::models::{
    InquiryThread, Message, MessageId, Notification, NotificationId, SenderRole, ThreadId,
    ThreadStatus, UserId,
};

/// In-memory implementation of InquiryStore
///
/// Uses HashMaps protected by RwLocks for thread-safe access. The bulk
/// read-state flip runs under a single write lock, which gives it the
/// same all-or-nothing behavior the SQLite implementation gets from a
/// single conditional UPDATE.
pub struct InMemoryInquiryStore {
    threads: RwLock<HashMap<String, InquiryThread>>,
    messages: RwLock<HashMap<String, Message>>,
    thread_messages: RwLock<HashMap<String, HashSet<String>>>,
    notifications: RwLock<HashMap<String, Notification>>,
}

impl InMemoryInquiryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
            messages: RwLock::new(HashMap::new()),
            thread_messages: RwLock::new(HashMap::new()),
            notifications: RwLock::new(HashMap::new()),
        }
    }

    fn collect_sorted(&self, mut threads: Vec<InquiryThread>) -> Vec<InquiryThread> {
        threads.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        threads
    }
}

impl Default for InMemoryInquiryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InquiryStore for InMemoryInquiryStore {
    fn upsert_thread(&self, thread: InquiryThread) -> Result<()> {
        let mut threads = self.threads.write().unwrap();
        threads.insert(thread.id.0.clone(), thread);
        Ok(())
    }

    fn get_thread(&self, id: &ThreadId) -> Result<Option<InquiryThread>> {
        let threads = self.threads.read().unwrap();
        Ok(threads.get(&id.0).cloned())
    }

    fn has_thread(&self, id: &ThreadId) -> Result<bool> {
        let threads = self.threads.read().unwrap();
        Ok(threads.contains_key(&id.0))
    }

    fn set_thread_status(&self, id: &ThreadId, status: ThreadStatus) -> Result<()> {
        let mut threads = self.threads.write().unwrap();
        if let Some(thread) = threads.get_mut(&id.0) {
            thread.status = status;
        }
        Ok(())
    }

    fn list_open_threads(&self) -> Result<Vec<InquiryThread>> {
        let threads = self.threads.read().unwrap();
        let open: Vec<_> = threads.values().filter(|t| t.is_open()).cloned().collect();
        Ok(self.collect_sorted(open))
    }

    fn list_threads_for_owner(&self, owner: &UserId) -> Result<Vec<InquiryThread>> {
        let threads = self.threads.read().unwrap();
        let owned: Vec<_> = threads
            .values()
            .filter(|t| t.owner_user_id == *owner)
            .cloned()
            .collect();
        Ok(self.collect_sorted(owned))
    }

    fn count_threads(&self) -> Result<usize> {
        let threads = self.threads.read().unwrap();
        Ok(threads.len())
    }

    fn upsert_message(&self, message: Message) -> Result<()> {
        let thread_id = message.thread_id.0.clone();
        let msg_id = message.id.0.clone();

        let mut messages = self.messages.write().unwrap();
        messages.insert(msg_id.clone(), message);
        drop(messages);

        let mut thread_messages = self.thread_messages.write().unwrap();
        thread_messages.entry(thread_id).or_default().insert(msg_id);

        Ok(())
    }

    fn get_message(&self, id: &MessageId) -> Result<Option<Message>> {
        let messages = self.messages.read().unwrap();
        Ok(messages.get(&id.0).cloned())
    }

    fn list_messages_for_thread(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        let thread_messages = self.thread_messages.read().unwrap();
        let messages = self.messages.read().unwrap();

        let mut result = Vec::new();

        if let Some(msg_ids) = thread_messages.get(&thread_id.0) {
            for msg_id in msg_ids {
                if let Some(msg) = messages.get(msg_id) {
                    result.push(msg.clone());
                }
            }
        }

        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(result)
    }

    fn count_messages_in_thread(&self, thread_id: &ThreadId) -> Result<usize> {
        let thread_messages = self.thread_messages.read().unwrap();
        Ok(thread_messages
            .get(&thread_id.0)
            .map(|s| s.len())
            .unwrap_or(0))
    }

    fn unread_count_in_thread(
        &self,
        thread_id: &ThreadId,
        sender_role: SenderRole,
    ) -> Result<usize> {
        let messages = self.messages.read().unwrap();
        Ok(messages
            .values()
            .filter(|m| {
                m.thread_id == *thread_id && m.sender_role == sender_role && !m.is_read
            })
            .count())
    }

    fn mark_messages_read(&self, thread_id: &ThreadId, sender_role: SenderRole) -> Result<usize> {
        // One write lock for the whole flip: the concurrent-duplicate case
        // sees either all rows already flipped or none, never a partial mix.
        let mut messages = self.messages.write().unwrap();
        let mut flipped = 0;
        for msg in messages.values_mut() {
            if msg.thread_id == *thread_id && msg.sender_role == sender_role && !msg.is_read {
                msg.is_read = true;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    fn upsert_notification(&self, notification: Notification) -> Result<()> {
        let mut notifications = self.notifications.write().unwrap();
        notifications.insert(notification.id.0.clone(), notification);
        Ok(())
    }

    fn get_notification(&self, id: &NotificationId) -> Result<Option<Notification>> {
        let notifications = self.notifications.read().unwrap();
        Ok(notifications.get(&id.0).cloned())
    }

    fn mark_notification_read(&self, id: &NotificationId) -> Result<Option<Notification>> {
        let mut notifications = self.notifications.write().unwrap();
        match notifications.get_mut(&id.0) {
            Some(notification) => {
                notification.is_read = true;
                Ok(Some(notification.clone()))
            }
            None => Ok(None),
        }
    }

    fn list_notifications_for_user(&self, user: &UserId) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().unwrap();
        let mut result: Vec<_> = notifications
            .values()
            .filter(|n| n.recipient_user_id == *user)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    fn count_unread_notifications(&self, user: &UserId) -> Result<usize> {
        let notifications = self.notifications.read().unwrap();
        Ok(notifications
            .values()
            .filter(|n| n.recipient_user_id == *user && !n.is_read)
            .count())
    }

    fn clear(&self) -> Result<()> {
        self.threads.write().unwrap().clear();
        self.messages.write().unwrap().clear();
        self.thread_messages.write().unwrap().clear();
        self.notifications.write().unwrap().clear();
        Ok(())
    }
}
