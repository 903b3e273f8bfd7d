//! Domain models for inquiry threads, messages, and notifications

mod message;
mod notification;
mod thread;

pub use message::{Message, MessageBuilder, MessageId, ParseSenderRoleError, SenderRole};
pub use notification::{Notification, NotificationId};
pub use thread::{InquiryThread, ParseThreadStatusError, ThreadId, ThreadStatus, UserId};
