//! Read-state sync triggers
//!
//! One-shot adapters that fire the read-state engine when a viewing
//! context becomes active, decoupled from the view's render output.

mod view;

pub use view::{NotificationReadTrigger, ThreadReadTrigger};
