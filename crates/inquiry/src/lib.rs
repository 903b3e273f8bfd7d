//! Inquiry crate - read-state subsystem for Aisle's planner inquiries
//!
//! This crate provides the messaging backbone between couples and the
//! planning team, including:
//! - Domain models (InquiryThread, Message, Notification)
//! - Storage trait abstractions with in-memory and SQLite backends
//! - Idempotent read-state engine (the only writer of `is_read`)
//! - Unread-count and inbox queries for UI consumption
//! - View-triggered sync adapters that mark content read on view
//!
//! This crate has zero UI dependencies; the admin and user surfaces of
//! the application call in through the exported operations and render
//! whatever they like around them.

pub mod config;
pub mod models;
pub mod query;
pub mod readstate;
pub mod service;
pub mod storage;
pub mod sync;

pub use config::StoreSettings;
pub use models::{
    InquiryThread, Message, MessageBuilder, MessageId, Notification, NotificationId, SenderRole,
    ThreadId, ThreadStatus, UserId,
};
pub use query::{
    ThreadDetail, ThreadSummary, get_thread_detail, list_inquiries_for_admin,
    list_inquiries_for_user, unread_inquiry_count, unread_inquiry_count_for_admin,
    unread_notification_count,
};
pub use readstate::ReadStateEngine;
pub use service::InquiryService;
pub use storage::{InMemoryInquiryStore, InquiryStore, SqliteInquiryStore};
pub use sync::{NotificationReadTrigger, ThreadReadTrigger};
