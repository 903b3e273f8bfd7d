//! Inquiry lifecycle module
//!
//! Provides the high-level handler for opening inquiries, posting
//! messages, closing threads, and delivering notifications.

mod handler;

pub use handler::InquiryService;
