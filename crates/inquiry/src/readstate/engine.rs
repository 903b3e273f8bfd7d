//! Read-state engine for inquiry threads and notifications
//!
//! The only component allowed to mutate `is_read`, and the only
//! direction it ever moves is false -> true.

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;

use crate::models::{NotificationId, SenderRole, ThreadId, UserId};
use crate::storage::InquiryStore;

/// Applies idempotent mark-as-read transitions
///
/// Every mutation goes through the store's conditional bulk update.
/// Duplicate invocations (a re-rendering view firing its trigger twice,
/// two browser tabs on the same thread) converge on the same state:
/// `is_read` only ever moves false -> true.
#[derive(Clone)]
pub struct ReadStateEngine {
    store: Arc<dyn InquiryStore>,
}

impl ReadStateEngine {
    /// Create a new engine over an injected store
    pub fn new(store: Arc<dyn InquiryStore>) -> Self {
        Self { store }
    }

    /// Mark every message the given viewer has not yet seen in a thread
    /// as read.
    ///
    /// Only messages sent by the opposite role are touched: a viewer
    /// never needs the read state of their own side's messages. Calling
    /// this again with no intervening new messages changes nothing.
    /// An unknown thread is a no-op, not an error (the thread may have
    /// been closed out from under the viewing client).
    ///
    /// Returns the number of messages flipped; callers treat it as
    /// informational only.
    pub fn mark_thread_read(&self, thread_id: &ThreadId, viewer: SenderRole) -> Result<usize> {
        let flipped = self
            .store
            .mark_messages_read(thread_id, viewer.opposite())?;

        if flipped > 0 {
            info!(
                "Marked {} message(s) in thread {} read for {}",
                flipped,
                thread_id.as_str(),
                viewer
            );
        }

        Ok(flipped)
    }

    /// Ownership-scoped variant of [`mark_thread_read`](Self::mark_thread_read)
    ///
    /// Used by the admin viewing surface, which knows which user's
    /// inquiry it has open: the flip only applies when the thread is
    /// owned by `owner`. A mismatch or unknown thread is a no-op.
    /// Ownership never changes after a thread is created, so the check
    /// does not race with the bulk update.
    pub fn mark_thread_read_for_owner(
        &self,
        thread_id: &ThreadId,
        viewer: SenderRole,
        owner: &UserId,
    ) -> Result<usize> {
        match self.store.get_thread(thread_id)? {
            Some(thread) if thread.owner_user_id == *owner => {
                self.mark_thread_read(thread_id, viewer)
            }
            Some(_) => {
                debug!(
                    "Skipping read sync for thread {}: owner mismatch",
                    thread_id.as_str()
                );
                Ok(0)
            }
            None => Ok(0),
        }
    }

    /// Mark a single notification as read.
    ///
    /// A no-op when the notification is already read or the ID is
    /// unknown; only a store failure surfaces as an error, because that
    /// is the case the caller may want to react to.
    pub fn mark_notification_read(&self, id: &NotificationId) -> Result<()> {
        match self.store.mark_notification_read(id)? {
            Some(_) => {
                debug!("Notification {} marked read", id.as_str());
            }
            None => {
                debug!("Notification {} not found, nothing to mark", id.as_str());
            }
        }
        Ok(())
    }
}
