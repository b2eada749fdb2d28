//! # Lore Engine
//!
//! Decides, for every conversation turn, which world-info entries are spliced
//! into the prompt. Entries fire on keyword matches in the recent chat, hold
//! or back off through sticky, cooldown and delay windows kept in
//! caller-owned memory, and can trigger each other through the text they
//! inject.
//!
//! ## Core Components
//!
//! - **matching**: compiles author keys into reusable matchers
//! - **macros**: placeholder expansion for keys and content
//! - **activation**: preprocessing, the per-entry predicate, recursion
//!   scheduling and the public entry point

pub mod activation;
pub mod error;
pub mod macros;
pub mod matching;

pub use activation::*;
pub use error::*;
pub use macros::*;
pub use matching::*;
