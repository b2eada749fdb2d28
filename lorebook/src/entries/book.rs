//! A named collection of entries.

use serde::{Deserialize, Serialize};

use super::WorldInfoEntry;
use crate::error::LorebookResult;

/// A lorebook: the unit authors import, export, and attach to characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldInfoBook {
    pub name: String,
    pub entries: Vec<WorldInfoEntry>,
}

impl WorldInfoBook {
    /// Create an empty book.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Parse a book from its JSON export.
    pub fn from_json_str(json: &str) -> LorebookResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the book to pretty JSON.
    pub fn to_json_string(&self) -> LorebookResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder: append an entry.
    pub fn with_entry(mut self, entry: WorldInfoEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Entries that take part in activation.
    pub fn enabled_entries(&self) -> impl Iterator<Item = &WorldInfoEntry> {
        self.entries.iter().filter(|entry| entry.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book() {
        let json = r#"{
            "name": "Northern Reaches",
            "entries": [
                { "keys": ["frost"], "content": "The frost never melts." },
                { "keys": ["wolf"], "content": "Wolves hunt in packs.", "enabled": false }
            ]
        }"#;

        let book = WorldInfoBook::from_json_str(json).unwrap();
        assert_eq!(book.name, "Northern Reaches");
        assert_eq!(book.entries.len(), 2);
        assert_eq!(book.enabled_entries().count(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(WorldInfoBook::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_json_export_reloads() {
        let book = WorldInfoBook::new("Ports")
            .with_entry(WorldInfoEntry::new(["harbor"], "Ships dock at dawn."));

        let json = book.to_json_string().unwrap();
        let reloaded = WorldInfoBook::from_json_str(&json).unwrap();
        assert_eq!(reloaded, book);
    }
}
