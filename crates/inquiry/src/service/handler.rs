//! Inquiry lifecycle handler
//!
//! Creates and mutates the rows the read-state subsystem operates on:
//! opening inquiries, posting messages, closing and reopening threads,
//! and delivering notifications.

use anyhow::{Result, bail};
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::models::{
    InquiryThread, Message, MessageId, Notification, NotificationId, SenderRole, ThreadId,
    ThreadStatus, UserId,
};
use crate::storage::InquiryStore;

/// Handler for inquiry lifecycle operations
///
/// Identifiers are supplied by the caller: the surrounding application
/// owns ID generation, and this crate treats them as opaque.
pub struct InquiryService {
    store: Arc<dyn InquiryStore>,
}

impl InquiryService {
    /// Create a new inquiry service
    pub fn new(store: Arc<dyn InquiryStore>) -> Self {
        Self { store }
    }

    /// Open a new inquiry with its first user-sent message.
    ///
    /// The thread starts OPEN and immediately appears in the admin
    /// inbox with one unread message.
    pub fn open_inquiry(
        &self,
        thread_id: ThreadId,
        owner: UserId,
        subject: impl Into<String>,
        message_id: MessageId,
        body: impl Into<String>,
    ) -> Result<InquiryThread> {
        let now = Utc::now();
        let thread = InquiryThread::new(thread_id.clone(), owner, subject.into(), now);

        self.store.upsert_thread(thread.clone())?;
        self.store.upsert_message(
            Message::builder(message_id, thread_id.clone())
                .sender_role(SenderRole::User)
                .body(body)
                .created_at(now)
                .build(),
        )?;

        info!("Opened inquiry {}", thread_id.as_str());
        Ok(thread)
    }

    /// Append a message to an existing OPEN thread.
    ///
    /// The message starts unread for the opposite side, and the
    /// thread's last-activity timestamp moves forward.
    pub fn post_message(
        &self,
        message_id: MessageId,
        thread_id: &ThreadId,
        sender_role: SenderRole,
        body: impl Into<String>,
    ) -> Result<Message> {
        let Some(mut thread) = self.store.get_thread(thread_id)? else {
            bail!("Cannot post to unknown thread {}", thread_id.as_str());
        };
        if thread.status == ThreadStatus::Closed {
            bail!("Cannot post to closed thread {}", thread_id.as_str());
        }

        let message = Message::builder(message_id, thread_id.clone())
            .sender_role(sender_role)
            .body(body)
            .build();

        self.store.upsert_message(message.clone())?;

        thread.last_message_at = message.created_at;
        self.store.upsert_thread(thread)?;

        Ok(message)
    }

    /// Close a resolved inquiry, removing it from the admin inbox.
    ///
    /// The thread and its messages are kept; the owner can still see
    /// them and their unread state.
    pub fn close_inquiry(&self, thread_id: &ThreadId) -> Result<()> {
        if !self.store.has_thread(thread_id)? {
            bail!("Cannot close unknown thread {}", thread_id.as_str());
        }

        self.store
            .set_thread_status(thread_id, ThreadStatus::Closed)?;
        info!("Closed inquiry {}", thread_id.as_str());
        Ok(())
    }

    /// Reopen a closed inquiry
    pub fn reopen_inquiry(&self, thread_id: &ThreadId) -> Result<()> {
        if !self.store.has_thread(thread_id)? {
            bail!("Cannot reopen unknown thread {}", thread_id.as_str());
        }

        self.store.set_thread_status(thread_id, ThreadStatus::Open)?;
        info!("Reopened inquiry {}", thread_id.as_str());
        Ok(())
    }

    /// Deliver a notification to a user
    pub fn notify(
        &self,
        id: NotificationId,
        recipient: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Result<Notification> {
        let mut notification = Notification::new(id, recipient, title, body);
        if let Some(data) = data {
            notification = notification.with_data(data);
        }

        self.store.upsert_notification(notification.clone())?;
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{unread_inquiry_count, unread_inquiry_count_for_admin};
    use crate::storage::InMemoryInquiryStore;

    fn setup() -> (InquiryService, Arc<InMemoryInquiryStore>) {
        let store = Arc::new(InMemoryInquiryStore::new());
        let service = InquiryService::new(store.clone());
        (service, store)
    }

    #[test]
    fn test_open_inquiry_creates_unread_first_message() {
        let (service, store) = setup();

        service
            .open_inquiry(
                ThreadId::new("t1"),
                UserId::new("u1"),
                "Cake tasting",
                MessageId::new("m1"),
                "Can we book a tasting for three flavors?",
            )
            .unwrap();

        let thread = store.get_thread(&ThreadId::new("t1")).unwrap().unwrap();
        assert!(thread.is_open());

        // One unread user-sent message lands in the admin count
        assert_eq!(unread_inquiry_count_for_admin(store.as_ref()).unwrap(), 1);
        assert_eq!(
            unread_inquiry_count(store.as_ref(), &UserId::new("u1")).unwrap(),
            0
        );
    }

    #[test]
    fn test_post_message_bumps_last_activity() {
        let (service, store) = setup();
        service
            .open_inquiry(
                ThreadId::new("t1"),
                UserId::new("u1"),
                "Cake tasting",
                MessageId::new("m1"),
                "Can we book a tasting?",
            )
            .unwrap();

        let before = store
            .get_thread(&ThreadId::new("t1"))
            .unwrap()
            .unwrap()
            .last_message_at;

        let msg = service
            .post_message(
                MessageId::new("m2"),
                &ThreadId::new("t1"),
                SenderRole::Admin,
                "Of course, which weekend suits you?",
            )
            .unwrap();
        assert!(!msg.is_read);

        let after = store
            .get_thread(&ThreadId::new("t1"))
            .unwrap()
            .unwrap()
            .last_message_at;
        assert!(after >= before);

        // The admin reply is unread for the user
        assert_eq!(
            unread_inquiry_count(store.as_ref(), &UserId::new("u1")).unwrap(),
            1
        );
    }

    #[test]
    fn test_post_message_rejects_unknown_thread() {
        let (service, _store) = setup();
        let result = service.post_message(
            MessageId::new("m1"),
            &ThreadId::new("missing"),
            SenderRole::User,
            "Hello?",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_post_message_rejects_closed_thread() {
        let (service, _store) = setup();
        service
            .open_inquiry(
                ThreadId::new("t1"),
                UserId::new("u1"),
                "Cake tasting",
                MessageId::new("m1"),
                "Can we book a tasting?",
            )
            .unwrap();
        service.close_inquiry(&ThreadId::new("t1")).unwrap();

        let result = service.post_message(
            MessageId::new("m2"),
            &ThreadId::new("t1"),
            SenderRole::User,
            "One more thing...",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_close_and_reopen() {
        let (service, store) = setup();
        service
            .open_inquiry(
                ThreadId::new("t1"),
                UserId::new("u1"),
                "Cake tasting",
                MessageId::new("m1"),
                "Can we book a tasting?",
            )
            .unwrap();

        service.close_inquiry(&ThreadId::new("t1")).unwrap();
        assert_eq!(unread_inquiry_count_for_admin(store.as_ref()).unwrap(), 0);

        service.reopen_inquiry(&ThreadId::new("t1")).unwrap();
        assert_eq!(unread_inquiry_count_for_admin(store.as_ref()).unwrap(), 1);

        assert!(service.close_inquiry(&ThreadId::new("missing")).is_err());
        assert!(service.reopen_inquiry(&ThreadId::new("missing")).is_err());
    }

    #[test]
    fn test_notify() {
        let (service, store) = setup();
        service
            .notify(
                NotificationId::new("n1"),
                UserId::new("u1"),
                "Payment received",
                "Your deposit cleared.",
                Some(serde_json::json!({"invoice": "inv-7"})),
            )
            .unwrap();

        let n = store
            .get_notification(&NotificationId::new("n1"))
            .unwrap()
            .unwrap();
        assert!(!n.is_read);
        assert_eq!(n.data["invoice"], "inv-7");
    }
}
