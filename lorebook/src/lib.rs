//! # Lorebook
//!
//! The data crate for world-info: lore entries as authors write them, the chat
//! log they are matched against, and the conversation-scoped memory that keeps
//! timing state between turns. This crate holds no matching or scheduling
//! logic; see `lore_engine` for that.

pub mod entries;
pub mod error;
pub mod logic;
pub mod session;
pub mod settings;

pub use entries::*;
pub use error::*;
pub use logic::*;
pub use session::*;
pub use settings::*;
