//! Unread-count queries for the badge surfaces

use anyhow::Result;

use crate::models::{SenderRole, UserId};
use crate::storage::InquiryStore;

/// Total unread messages across the admin inbox.
///
/// Sums unread user-sent messages over all OPEN threads; closed threads
/// never contribute even when they still hold unread rows. The result
/// is a point-in-time snapshot: a concurrently running mark-as-read may
/// or may not be visible, which is acceptable for a badge value.
pub fn unread_inquiry_count_for_admin(store: &dyn InquiryStore) -> Result<usize> {
    let mut total = 0;
    for thread in store.list_open_threads()? {
        total += store.unread_count_in_thread(&thread.id, SenderRole::User)?;
    }
    Ok(total)
}

/// Total unread messages for one user's inquiry surface.
///
/// Sums unread admin-sent messages over every thread the user owns,
/// open or closed. Zero owned threads yields 0.
pub fn unread_inquiry_count(store: &dyn InquiryStore, user_id: &UserId) -> Result<usize> {
    let mut total = 0;
    for thread in store.list_threads_for_owner(user_id)? {
        total += store.unread_count_in_thread(&thread.id, SenderRole::Admin)?;
    }
    Ok(total)
}

/// Unread standalone notifications for a user
pub fn unread_notification_count(store: &dyn InquiryStore, user_id: &UserId) -> Result<usize> {
    store.count_unread_notifications(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        InquiryThread, Message, MessageId, Notification, NotificationId, ThreadId, ThreadStatus,
    };
    use crate::storage::InMemoryInquiryStore;
    use chrono::Utc;

    fn seed_thread(store: &InMemoryInquiryStore, id: &str, owner: &str) {
        store
            .upsert_thread(InquiryThread::new(
                ThreadId::new(id),
                UserId::new(owner),
                "Photographer shortlist".to_string(),
                Utc::now(),
            ))
            .unwrap();
    }

    fn seed_message(
        store: &InMemoryInquiryStore,
        id: &str,
        thread: &str,
        role: SenderRole,
        is_read: bool,
    ) {
        store
            .upsert_message(
                Message::builder(MessageId::new(id), ThreadId::new(thread))
                    .sender_role(role)
                    .body("Here are three portfolios we like.")
                    .is_read(is_read)
                    .build(),
            )
            .unwrap();
    }

    #[test]
    fn test_counts_split_by_role() {
        let store = InMemoryInquiryStore::new();
        seed_thread(&store, "t1", "u1");

        // 3 unread user-sent, 2 unread admin-sent
        for i in 0..3 {
            seed_message(&store, &format!("mu{}", i), "t1", SenderRole::User, false);
        }
        for i in 0..2 {
            seed_message(&store, &format!("ma{}", i), "t1", SenderRole::Admin, false);
        }

        // The user only counts admin-sent; the admin only counts user-sent
        assert_eq!(unread_inquiry_count(&store, &UserId::new("u1")).unwrap(), 2);
        assert_eq!(unread_inquiry_count_for_admin(&store).unwrap(), 3);
    }

    #[test]
    fn test_read_messages_do_not_count() {
        let store = InMemoryInquiryStore::new();
        seed_thread(&store, "t1", "u1");
        seed_message(&store, "m1", "t1", SenderRole::Admin, true);
        seed_message(&store, "m2", "t1", SenderRole::Admin, false);

        assert_eq!(unread_inquiry_count(&store, &UserId::new("u1")).unwrap(), 1);
    }

    #[test]
    fn test_closed_thread_excluded_from_admin_count() {
        let store = InMemoryInquiryStore::new();
        seed_thread(&store, "t1", "u1");
        seed_message(&store, "m1", "t1", SenderRole::User, false);

        assert_eq!(unread_inquiry_count_for_admin(&store).unwrap(), 1);

        store
            .set_thread_status(&ThreadId::new("t1"), ThreadStatus::Closed)
            .unwrap();

        // Still unread, but no longer admin-visible
        assert_eq!(unread_inquiry_count_for_admin(&store).unwrap(), 0);
    }

    #[test]
    fn test_closed_thread_still_counts_for_owner() {
        let store = InMemoryInquiryStore::new();
        seed_thread(&store, "t1", "u1");
        seed_message(&store, "m1", "t1", SenderRole::Admin, false);
        store
            .set_thread_status(&ThreadId::new("t1"), ThreadStatus::Closed)
            .unwrap();

        assert_eq!(unread_inquiry_count(&store, &UserId::new("u1")).unwrap(), 1);
    }

    #[test]
    fn test_empty_store_counts_zero() {
        let store = InMemoryInquiryStore::new();
        assert_eq!(unread_inquiry_count_for_admin(&store).unwrap(), 0);
        assert_eq!(unread_inquiry_count(&store, &UserId::new("u1")).unwrap(), 0);
        assert_eq!(
            unread_notification_count(&store, &UserId::new("u1")).unwrap(),
            0
        );
    }

    #[test]
    fn test_notification_count() {
        let store = InMemoryInquiryStore::new();
        store
            .upsert_notification(Notification::new(
                NotificationId::new("n1"),
                UserId::new("u1"),
                "Reminder",
                "Final headcount is due Friday.",
            ))
            .unwrap();

        assert_eq!(
            unread_notification_count(&store, &UserId::new("u1")).unwrap(),
            1
        );
    }
}
