//! The extension bag carried by every entry.

use serde::{Deserialize, Serialize};

use crate::logic::{InsertionPosition, PromptRole, SelectiveLogic};

/// Matching, timing, and recursion options for an entry.
///
/// Timing fields use `0` for "unset", matching exported lorebooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryExtensions {
    /// Placement; filled from the entry's `position` when absent.
    pub position: Option<InsertionPosition>,

    /// Role; defaults to system when absent.
    pub role: Option<PromptRole>,

    /// Ignore text injected by other entries when matching.
    pub exclude_recursion: bool,

    /// Never feed this entry's content to other entries.
    pub prevent_recursion: bool,

    /// Recursion level at which this entry becomes eligible.
    pub delay_until_recursion: u32,

    pub display_index: Option<i64>,

    /// Chance (0-100) that the entry may activate on a given call.
    pub probability: u8,

    #[serde(rename = "useProbability")]
    pub use_probability: bool,

    /// Insertion depth for `InsertionPosition::AtDepth`.
    pub depth: u32,

    #[serde(rename = "selectiveLogic")]
    pub selective_logic: SelectiveLogic,

    pub group: String,

    pub group_override: bool,

    /// Number of trailing chat messages to scan; global default when absent.
    pub scan_depth: Option<usize>,

    pub match_whole_words: Option<bool>,

    pub case_sensitive: Option<bool>,

    pub automation_id: String,

    pub vectorized: bool,

    /// Turns the entry stays active after a real activation.
    pub sticky: u32,

    /// Turns before a real activation may happen again.
    pub cooldown: u32,

    /// Minimum chat length before the entry can activate.
    pub delay: u32,
}

impl Default for EntryExtensions {
    fn default() -> Self {
        Self {
            position: None,
            role: None,
            exclude_recursion: false,
            prevent_recursion: false,
            delay_until_recursion: 0,
            display_index: None,
            probability: 100,
            use_probability: true,
            depth: 4,
            selective_logic: SelectiveLogic::AndAny,
            group: String::new(),
            group_override: false,
            scan_depth: None,
            match_whole_words: None,
            case_sensitive: None,
            automation_id: String::new(),
            vectorized: false,
            sticky: 0,
            cooldown: 0,
            delay: 0,
        }
    }
}

impl EntryExtensions {
    /// True when any timing window (sticky, cooldown, delay) is configured.
    pub fn has_timing(&self) -> bool {
        self.sticky > 0 || self.cooldown > 0 || self.delay > 0
    }
}
