//! Pattern Compiler - turns author-supplied key strings into text matchers.
//!
//! A key is either an explicit pattern literal (`/pattern/flags`), used as
//! written, or plain text, which is escaped, optionally wrapped in word
//! boundaries, and compiled with the effective case sensitivity.

mod keyset;
mod pattern;

pub use keyset::*;
pub use pattern::*;
