//! Single-key matchers and the pattern-literal parser seam.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static SLASH_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^/(.+?)/([gimsuy]*)$").expect("valid regex"));

/// Effective matching flags for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    pub match_whole_words: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            match_whole_words: true,
        }
    }
}

/// Recognizes explicit pattern literals in key strings.
///
/// Returning `None` means "not a literal"; the key is then compiled as plain
/// text. Implementations must not fail on malformed input.
pub trait PatternLiteralParser {
    fn parse(&self, source: &str) -> Option<Regex>;
}

/// Parses `/pattern/flags` literals.
///
/// Flags are drawn from `gimsuy`. `i`, `m` and `s` become regex flags; the rest
/// carry no meaning for a stateless matcher and are ignored. `\/` inside the
/// pattern stands for a literal slash.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlashPatternParser;

impl PatternLiteralParser for SlashPatternParser {
    fn parse(&self, source: &str) -> Option<Regex> {
        let captures = SLASH_LITERAL.captures(source)?;
        let pattern = captures[1].replace("\\/", "/");
        let flags = &captures[2];

        RegexBuilder::new(&pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .ok()
    }
}

/// A compiled key.
///
/// Matching is stateless: every call scans the whole text from the start, so
/// one matcher can be reused any number of times within a call.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    source: String,
    regex: Regex,
    literal: bool,
}

impl KeyMatcher {
    /// Compile `source`, trying the pattern-literal parser first.
    pub fn compile(
        source: &str,
        options: MatchOptions,
        parser: &dyn PatternLiteralParser,
    ) -> Result<Self, regex::Error> {
        if let Some(regex) = parser.parse(source) {
            return Ok(Self {
                source: source.to_string(),
                regex,
                literal: true,
            });
        }

        let mut pattern = regex::escape(source);
        if options.match_whole_words {
            pattern = format!(r"\b{}\b", pattern);
        }

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .build()?;

        Ok(Self {
            source: source.to_string(),
            regex,
            literal: false,
        })
    }

    /// Does the key occur anywhere in `text`?
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The key as written (after macro expansion).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the key was an explicit pattern literal.
    pub fn is_pattern_literal(&self) -> bool {
        self.literal
    }
}
