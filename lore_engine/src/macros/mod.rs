//! Macro expansion for keys and content.
//!
//! The engine only depends on the [`MacroExpander`] contract. The
//! [`BasicMacroExpander`] covers the placeholders lorebooks use most and is the
//! default when no other expander is supplied.

mod basic;

pub use basic::*;

use lorebook::{ActivationMemory, Environment};
use thiserror::Error;

/// Failures raised by a macro expander. The engine never catches these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MacroError {
    #[error("unknown macro: {{{{{0}}}}}")]
    Unknown(String),

    #[error("macro expansion failed: {0}")]
    Failed(String),
}

/// Substitutes placeholders in a template.
///
/// Must be pure with respect to its inputs apart from reading `memory`.
pub trait MacroExpander {
    fn expand(
        &self,
        template: &str,
        env: &Environment,
        memory: &ActivationMemory,
    ) -> Result<String, MacroError>;
}

impl<F> MacroExpander for F
where
    F: Fn(&str, &Environment, &ActivationMemory) -> Result<String, MacroError>,
{
    fn expand(
        &self,
        template: &str,
        env: &Environment,
        memory: &ActivationMemory,
    ) -> Result<String, MacroError> {
        self(template, env, memory)
    }
}
