//! Selective logic, placement and role codes for world-info entries.
//!
//! Lorebooks exported from character cards store these as small integers, so
//! every enum here round-trips through its numeric code.

use serde::{Deserialize, Serialize};

use crate::error::LorebookError;

/// How secondary keys combine with a primary-key match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum SelectiveLogic {
    /// At least one secondary key matches.
    #[default]
    AndAny,
    /// At least one secondary key fails to match.
    NotAll,
    /// No secondary key matches.
    NotAny,
    /// Every secondary key matches.
    AndAll,
}

impl SelectiveLogic {
    /// Combine per-key match results under this logic.
    ///
    /// `results` yields one boolean per secondary key, in declaration order.
    pub fn evaluate(&self, mut results: impl Iterator<Item = bool>) -> bool {
        match self {
            SelectiveLogic::AndAny => results.any(|hit| hit),
            SelectiveLogic::NotAll => results.any(|hit| !hit),
            SelectiveLogic::NotAny => !results.any(|hit| hit),
            SelectiveLogic::AndAll => results.all(|hit| hit),
        }
    }
}

impl TryFrom<u8> for SelectiveLogic {
    type Error = LorebookError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SelectiveLogic::AndAny),
            1 => Ok(SelectiveLogic::NotAll),
            2 => Ok(SelectiveLogic::NotAny),
            3 => Ok(SelectiveLogic::AndAll),
            _ => Err(LorebookError::InvalidCode {
                kind: "selective logic",
                code,
            }),
        }
    }
}

impl From<SelectiveLogic> for u8 {
    fn from(logic: SelectiveLogic) -> Self {
        match logic {
            SelectiveLogic::AndAny => 0,
            SelectiveLogic::NotAll => 1,
            SelectiveLogic::NotAny => 2,
            SelectiveLogic::AndAll => 3,
        }
    }
}

/// Where downstream prompt assembly splices an activated entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InsertionPosition {
    /// Before the character definition.
    Before,
    /// After the character definition.
    After,
    /// Top of the author's note.
    AuthorsNoteTop,
    /// Bottom of the author's note.
    AuthorsNoteBottom,
    /// Inside the chat history, `extensions.depth` messages from the end.
    AtDepth,
    /// Top of the example messages.
    ExamplesTop,
    /// Bottom of the example messages.
    ExamplesBottom,
}

impl TryFrom<u8> for InsertionPosition {
    type Error = LorebookError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(InsertionPosition::Before),
            1 => Ok(InsertionPosition::After),
            2 => Ok(InsertionPosition::AuthorsNoteTop),
            3 => Ok(InsertionPosition::AuthorsNoteBottom),
            4 => Ok(InsertionPosition::AtDepth),
            5 => Ok(InsertionPosition::ExamplesTop),
            6 => Ok(InsertionPosition::ExamplesBottom),
            _ => Err(LorebookError::InvalidCode {
                kind: "insertion position",
                code,
            }),
        }
    }
}

impl From<InsertionPosition> for u8 {
    fn from(position: InsertionPosition) -> Self {
        match position {
            InsertionPosition::Before => 0,
            InsertionPosition::After => 1,
            InsertionPosition::AuthorsNoteTop => 2,
            InsertionPosition::AuthorsNoteBottom => 3,
            InsertionPosition::AtDepth => 4,
            InsertionPosition::ExamplesTop => 5,
            InsertionPosition::ExamplesBottom => 6,
        }
    }
}

/// Message role used when an entry is injected as its own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum PromptRole {
    #[default]
    System,
    User,
    Assistant,
}

impl TryFrom<u8> for PromptRole {
    type Error = LorebookError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PromptRole::System),
            1 => Ok(PromptRole::User),
            2 => Ok(PromptRole::Assistant),
            _ => Err(LorebookError::InvalidCode {
                kind: "prompt role",
                code,
            }),
        }
    }
}

impl From<PromptRole> for u8 {
    fn from(role: PromptRole) -> Self {
        match role {
            PromptRole::System => 0,
            PromptRole::User => 1,
            PromptRole::Assistant => 2,
        }
    }
}

/// Card-level placement of an entry relative to the character definition.
///
/// Anything other than `before_char` is treated as `after_char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum CharPosition {
    #[default]
    BeforeChar,
    AfterChar,
}

impl CharPosition {
    /// The insertion position an entry gets when its extensions leave it unset.
    pub fn default_insertion(&self) -> InsertionPosition {
        match self {
            CharPosition::BeforeChar => InsertionPosition::Before,
            CharPosition::AfterChar => InsertionPosition::After,
        }
    }
}

impl From<String> for CharPosition {
    fn from(value: String) -> Self {
        if value == "before_char" {
            CharPosition::BeforeChar
        } else {
            CharPosition::AfterChar
        }
    }
}

impl From<CharPosition> for String {
    fn from(position: CharPosition) -> Self {
        match position {
            CharPosition::BeforeChar => "before_char".to_string(),
            CharPosition::AfterChar => "after_char".to_string(),
        }
    }
}
