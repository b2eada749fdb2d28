//! Conversation state the engine reads and writes: the chat log, the macro
//! environment, and the per-conversation activation memory.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Identifies one conversation's activation memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil session ID (useful for fixtures).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an entry among the enabled entries of one evaluation call.
///
/// Assigned once before any scheduling pass and never renumbered, so timing
/// state keyed by it stays attached to the same entry across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(pub usize);

impl std::fmt::Display for StableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub role: String,
    /// Display name of the author; the role is used when absent.
    #[serde(default)]
    pub speaker: Option<String>,
    pub content: String,
}

impl ChatLogEntry {
    /// Create a message from a named speaker.
    pub fn new(
        role: impl Into<String>,
        speaker: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            speaker: Some(speaker.into()),
            content: content.into(),
        }
    }

    /// Create a message attributed only by role.
    pub fn anonymous(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            speaker: None,
            content: content.into(),
        }
    }

    /// Name shown in front of the message when scanning.
    pub fn display_name(&self) -> &str {
        match self.speaker.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.role,
        }
    }

    /// Render as `"{speaker}: {content}"`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.display_name(), self.content)
    }
}

/// Named values available to macro expansion (user, char, model, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Get a value by exact name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Get a value by name, ignoring case.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.get(name).or_else(|| {
            let wanted = name.to_lowercase();
            self.vars
                .iter()
                .find(|(key, _)| key.to_lowercase() == wanted)
                .map(|(_, value)| value.as_str())
        })
    }

    /// Iterate over all values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when no values are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Conversation-scoped memory owned by the caller.
///
/// Created empty when a conversation starts and passed into every activation
/// call. The engine records the chat length at which each entry last truly
/// activated; sticky and cooldown windows are measured from that value.
/// Calls sharing one memory must be serialized by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationMemory {
    pub session: SessionId,

    /// Stable id -> chat length at last real activation.
    #[serde(default)]
    activated_at: BTreeMap<StableId, usize>,

    /// Chat variables, readable by macros.
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Variables shared across chats, readable by macros.
    #[serde(default)]
    pub global_variables: HashMap<String, String>,
}

impl ActivationMemory {
    /// Create an empty memory for a new conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chat length at which the entry last truly activated.
    pub fn last_activated(&self, id: StableId) -> Option<usize> {
        self.activated_at.get(&id).copied()
    }

    /// Record a real activation at the given chat length.
    pub fn record_activation(&mut self, id: StableId, chat_length: usize) {
        self.activated_at.insert(id, chat_length);
    }

    /// Forget an entry's activation history.
    pub fn forget(&mut self, id: StableId) -> Option<usize> {
        self.activated_at.remove(&id)
    }

    /// Iterate over all recorded activations.
    pub fn iter_activations(&self) -> impl Iterator<Item = (StableId, usize)> + '_ {
        self.activated_at.iter().map(|(id, len)| (*id, *len))
    }

    /// Number of entries with recorded activations.
    pub fn activation_count(&self) -> usize {
        self.activated_at.len()
    }

    /// Look up a chat variable, or a global one when `global` is set.
    pub fn variable(&self, name: &str, global: bool) -> Option<&str> {
        let storage = if global {
            &self.global_variables
        } else {
            &self.variables
        };
        storage.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_uses_speaker_then_role() {
        let named = ChatLogEntry::new("user", "Ann", "hello");
        let anonymous = ChatLogEntry::anonymous("assistant", "hi");

        assert_eq!(named.render(), "Ann: hello");
        assert_eq!(anonymous.render(), "assistant: hi");
    }

    #[test]
    fn test_memory_records_and_forgets() {
        let mut memory = ActivationMemory::new();
        assert_eq!(memory.last_activated(StableId(0)), None);

        memory.record_activation(StableId(0), 3);
        memory.record_activation(StableId(0), 5);
        assert_eq!(memory.last_activated(StableId(0)), Some(5));
        assert_eq!(memory.activation_count(), 1);

        assert_eq!(memory.forget(StableId(0)), Some(5));
        assert_eq!(memory.activation_count(), 0);
    }

    #[test]
    fn test_memory_persists_through_json() {
        let mut memory = ActivationMemory::new();
        memory.record_activation(StableId(2), 7);
        memory.variables.insert("mood".to_string(), "grim".to_string());

        let json = serde_json::to_string(&memory).unwrap();
        let restored: ActivationMemory = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, memory);
        assert_eq!(restored.last_activated(StableId(2)), Some(7));
    }

    #[test]
    fn test_environment_lookup() {
        let env = Environment::new().with("user", "Ann").with("char", "Bram");
        assert_eq!(env.get("char"), Some("Bram"));
        assert_eq!(env.get("model"), None);
        assert_eq!(env.get("CHAR"), None);
        assert_eq!(env.get_ignore_case("CHAR"), Some("Bram"));
        assert_eq!(env.iter().count(), 2);
    }
}
