//! Query API for UI consumption
//!
//! Provides high-level query functions that return data formatted
//! for display: inbox listings, thread detail, and the unread-count
//! badge values.

mod threads;
mod unread;

pub use threads::{ThreadDetail, ThreadSummary, get_thread_detail, list_inquiries_for_admin, list_inquiries_for_user};
pub use unread::{unread_inquiry_count, unread_inquiry_count_for_admin, unread_notification_count};
