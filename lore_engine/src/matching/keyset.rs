//! Groups of compiled keys and how they are combined.

use lorebook::SelectiveLogic;

use super::{KeyMatcher, MatchOptions, PatternLiteralParser};

/// The compiled primary or secondary keys of one entry.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    matchers: Vec<KeyMatcher>,
}

impl KeySet {
    /// Compile every key with the same options.
    pub fn compile<'a>(
        sources: impl IntoIterator<Item = &'a str>,
        options: MatchOptions,
        parser: &dyn PatternLiteralParser,
    ) -> Result<Self, regex::Error> {
        let matchers = sources
            .into_iter()
            .map(|source| KeyMatcher::compile(source, options, parser))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { matchers })
    }

    /// True when the entry has no keys of this kind.
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Number of compiled keys.
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// True if any key occurs in `text`.
    pub fn any_match(&self, text: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(text))
    }

    /// Combine per-key results under `logic`, short-circuiting where possible.
    pub fn satisfies(&self, logic: SelectiveLogic, text: &str) -> bool {
        logic.evaluate(self.matchers.iter().map(|m| m.matches(text)))
    }
}
