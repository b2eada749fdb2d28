//! Errors raised while loading lore data.

use thiserror::Error;

/// Failures when decoding books, settings, or enum codes.
#[derive(Debug, Error)]
pub enum LorebookError {
    #[error("invalid {kind} code: {code}")]
    InvalidCode { kind: &'static str, code: u8 },

    #[error("failed to parse lorebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse scan settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type LorebookResult<T> = std::result::Result<T, LorebookError>;
