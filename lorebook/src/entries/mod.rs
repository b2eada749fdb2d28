//! World-info entries as authored in a lorebook.

mod book;
mod extensions;

pub use book::*;
pub use extensions::*;

use serde::{Deserialize, Serialize};

use crate::logic::CharPosition;

/// A single lore unit: trigger keys plus the content injected when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldInfoEntry {
    /// Author-assigned identifier. Not used for activation bookkeeping.
    pub id: Option<i64>,

    /// Primary trigger patterns. Any match activates the entry.
    pub keys: Vec<String>,

    /// Secondary patterns, combined per `extensions.selective_logic`.
    pub secondary_keys: Vec<String>,

    pub comment: String,

    /// Template injected into the prompt on activation.
    pub content: String,

    /// Always active while enabled; skips matching entirely.
    pub constant: bool,

    pub selective: bool,

    /// Ordering hint for prompt assembly.
    pub insertion_order: i64,

    pub enabled: bool,

    pub position: CharPosition,

    pub extensions: EntryExtensions,
}

impl Default for WorldInfoEntry {
    fn default() -> Self {
        Self {
            id: None,
            keys: Vec::new(),
            secondary_keys: Vec::new(),
            comment: String::new(),
            content: String::new(),
            constant: false,
            selective: false,
            insertion_order: 100,
            enabled: true,
            position: CharPosition::BeforeChar,
            extensions: EntryExtensions::default(),
        }
    }
}

impl WorldInfoEntry {
    /// Create an enabled entry triggered by `keys`.
    pub fn new<K, S>(keys: K, content: impl Into<String>) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Create an always-active entry.
    pub fn constant(content: impl Into<String>) -> Self {
        Self {
            constant: true,
            content: content.into(),
            ..Self::default()
        }
    }

    /// Builder: add secondary keys.
    pub fn with_secondary_keys<K, S>(mut self, keys: K) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secondary_keys = keys.into_iter().map(Into::into).collect();
        self.selective = !self.secondary_keys.is_empty();
        self
    }

    /// Builder: replace the extension bag.
    pub fn with_extensions(mut self, extensions: EntryExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Builder: set the comment shown to authors.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Builder: enable or disable the entry.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
