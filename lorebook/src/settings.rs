//! Process-wide scan defaults, supplied by the caller at startup.

use serde::{Deserialize, Serialize};

use crate::error::LorebookResult;

/// Global matching defaults. Entries may override each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Number of trailing chat messages searched for keys.
    pub depth: usize,

    pub case_sensitive: bool,

    /// Wrap literal keys in word boundaries.
    pub match_whole_words: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            depth: 4,
            case_sensitive: false,
            match_whole_words: true,
        }
    }
}

impl ScanSettings {
    /// Load settings from a TOML document. Missing fields keep their defaults.
    ///
    /// ```
    /// use lorebook::ScanSettings;
    ///
    /// let settings = ScanSettings::from_toml_str("depth = 8").unwrap();
    /// assert_eq!(settings.depth, 8);
    /// assert!(settings.match_whole_words);
    /// ```
    pub fn from_toml_str(source: &str) -> LorebookResult<Self> {
        Ok(toml::from_str(source)?)
    }
}
