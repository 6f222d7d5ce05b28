//! Session domain module.
//!
//! # Module Structure
//!
//! - `message`: message and role types
//! - `history`: the live per-user history and its structured leading instruction
//! - `store`: the process-wide user id → history mapping

mod history;
mod message;
mod store;

pub use history::{
    DEFAULT_INSTRUCTION, HistoryHandle, LeadingInstruction, PORTRAIT_MARKER, SessionHistory,
};
pub use message::{Message, MessageRole};
pub use store::SessionStore;
