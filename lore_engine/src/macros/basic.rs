//! A small, deterministic macro expander.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use lorebook::{ActivationMemory, Environment};

use super::{MacroError, MacroExpander};

static USER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<user>").expect("valid regex"));
static CHAR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<bot>|<char>").expect("valid regex"));
static GROUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<charifnotgroup>|<group>").expect("valid regex"));
static REVERSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{reverse::(.*?)\}\}").expect("valid regex"));
static GET_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\{\{(getvar|getglobalvar)::([^}]+)\}\}").expect("valid regex")
});
static NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{newline\}\}").expect("valid regex"));
static TRIM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\n*\{\{trim\}\}\n*").expect("valid regex"));
static NOOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\{\{noop\}\}").expect("valid regex"));
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{//.*?\}\}").expect("valid regex"));
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"));

/// Expands the common lorebook placeholders.
///
/// Supported: `<user>`, `<char>`/`<bot>`, `<group>`/`<charifnotgroup>`, every
/// environment value as `{{name}}` (case-insensitive), `{{newline}}`,
/// `{{trim}}`, `{{noop}}`, `{{// comments}}`, `{{reverse::text}}`,
/// `{{getvar::name}}` and `{{getglobalvar::name}}`.
///
/// Unknown macros are left in place, or rejected when `strict` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicMacroExpander {
    pub strict: bool,
}

impl BasicMacroExpander {
    /// A lenient expander that leaves unknown macros in place.
    pub fn new() -> Self {
        Self::default()
    }

    /// An expander that fails on any macro it does not understand.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

fn replace_tag(text: String, tag: &Regex, value: Option<&str>) -> String {
    match value {
        Some(value) => tag.replace_all(&text, regex::NoExpand(value)).into_owned(),
        None => text,
    }
}

impl MacroExpander for BasicMacroExpander {
    fn expand(
        &self,
        template: &str,
        env: &Environment,
        memory: &ActivationMemory,
    ) -> Result<String, MacroError> {
        if template.is_empty() {
            return Ok(String::new());
        }

        let mut text = template.to_string();
        text = replace_tag(text, &USER_TAG, env.get("user"));
        text = replace_tag(text, &CHAR_TAG, env.get("char"));
        text = replace_tag(text, &GROUP_TAG, env.get("group"));

        if !text.contains("{{") {
            return Ok(text);
        }

        text = REVERSE
            .replace_all(&text, |caps: &Captures| caps[1].chars().rev().collect::<String>())
            .into_owned();
        text = GET_VAR
            .replace_all(&text, |caps: &Captures| {
                let global = caps[1].eq_ignore_ascii_case("getglobalvar");
                memory
                    .variable(caps[2].trim(), global)
                    .unwrap_or_default()
                    .to_string()
            })
            .into_owned();
        text = NEWLINE.replace_all(&text, "\n").into_owned();
        text = TRIM.replace_all(&text, "").into_owned();
        text = NOOP.replace_all(&text, "").into_owned();

        text = PLACEHOLDER
            .replace_all(&text, |caps: &Captures| match env.get_ignore_case(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned();

        text = COMMENT.replace_all(&text, "").into_owned();

        if self.strict {
            if let Some(caps) = PLACEHOLDER.captures(&text) {
                return Err(MacroError::Unknown(caps[1].to_string()));
            }
        }

        Ok(text)
    }
}
