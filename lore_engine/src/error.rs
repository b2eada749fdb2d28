//! Engine errors.

use thiserror::Error;

use crate::macros::MacroError;

/// Anything that aborts an activation call. Memory is left untouched.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Macro(#[from] MacroError),

    #[error("failed to compile key {key:?}: {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
