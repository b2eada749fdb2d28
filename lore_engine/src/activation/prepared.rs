//! Entry Preprocessor - runs once per call, before any scheduling pass.

use lorebook::{
    ActivationMemory, Environment, PromptRole, ScanSettings, StableId, WorldInfoEntry,
};
use tracing::trace;

use super::predicate::ActivationPredicate;
use super::probability::{passes_probability_gate, ProbabilityMode};
use crate::error::{EngineError, EngineResult};
use crate::macros::MacroExpander;
use crate::matching::{KeySet, MatchOptions, PatternLiteralParser};

/// A deep copy of an enabled entry, ready for scheduling.
#[derive(Debug, Clone)]
pub struct PreparedEntry {
    /// The entry with expanded keys and filled placement defaults.
    pub entry: WorldInfoEntry,
    pub predicate: ActivationPredicate,
}

impl PreparedEntry {
    /// Stable id assigned for this call.
    pub fn id(&self) -> StableId {
        self.predicate.id
    }

    /// Level at which the entry becomes eligible.
    pub fn recursion_level(&self) -> u32 {
        self.entry.extensions.delay_until_recursion
    }
}

fn expand_keys(
    keys: &[String],
    env: &Environment,
    memory: &ActivationMemory,
    expander: &dyn MacroExpander,
) -> EngineResult<Vec<String>> {
    let mut expanded = Vec::with_capacity(keys.len());
    for key in keys {
        let key = expander.expand(key, env, memory)?;
        if !key.is_empty() {
            expanded.push(key);
        }
    }
    Ok(expanded)
}

fn compile_keys(
    keys: &[String],
    options: MatchOptions,
    parser: &dyn PatternLiteralParser,
) -> EngineResult<KeySet> {
    KeySet::compile(keys.iter().map(String::as_str), options, parser).map_err(|source| {
        EngineError::Pattern {
            key: keys.join(", "),
            source,
        }
    })
}

/// Copy the enabled entries, assign stable ids, and bind their predicates.
///
/// Stable ids are positions among the enabled entries and are fixed here.
pub fn prepare_entries(
    entries: &[WorldInfoEntry],
    env: &Environment,
    memory: &ActivationMemory,
    settings: &ScanSettings,
    probability: ProbabilityMode,
    expander: &dyn MacroExpander,
    parser: &dyn PatternLiteralParser,
) -> EngineResult<Vec<PreparedEntry>> {
    let mut prepared = Vec::new();

    for (index, source) in entries.iter().filter(|e| e.enabled).enumerate() {
        let id = StableId(index);
        let mut entry = source.clone();

        entry.keys = expand_keys(&entry.keys, env, memory, expander)?;
        entry.secondary_keys = expand_keys(&entry.secondary_keys, env, memory, expander)?;

        let ext = &mut entry.extensions;
        ext.position.get_or_insert(entry.position.default_insertion());
        ext.role.get_or_insert(PromptRole::System);

        let options = MatchOptions {
            case_sensitive: ext.case_sensitive.unwrap_or(settings.case_sensitive),
            match_whole_words: ext.match_whole_words.unwrap_or(settings.match_whole_words),
        };
        let keys = compile_keys(&entry.keys, options, parser)?;
        let secondary_keys = compile_keys(&entry.secondary_keys, options, parser)?;
        let probability_passed = passes_probability_gate(&entry, probability);

        let ext = &entry.extensions;
        let predicate = ActivationPredicate {
            id,
            keys,
            secondary_keys,
            logic: ext.selective_logic,
            scan_depth: ext.scan_depth.unwrap_or(settings.depth),
            sticky: ext.sticky,
            cooldown: ext.cooldown,
            delay: ext.delay,
            exclude_recursion: ext.exclude_recursion,
            probability_passed,
        };

        trace!(
            entry = %id,
            keys = predicate.keys.len(),
            secondary_keys = predicate.secondary_keys.len(),
            probability_passed,
            "prepared world-info entry"
        );

        prepared.push(PreparedEntry { entry, predicate });
    }

    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{BasicMacroExpander, MacroError};
    use crate::matching::SlashPatternParser;
    use lorebook::{CharPosition, EntryExtensions, InsertionPosition};

    fn prepare(entries: &[WorldInfoEntry], env: &Environment) -> Vec<PreparedEntry> {
        prepare_entries(
            entries,
            env,
            &ActivationMemory::new(),
            &ScanSettings::default(),
            ProbabilityMode::Seeded,
            &BasicMacroExpander::new(),
            &SlashPatternParser,
        )
        .unwrap()
    }

    #[test]
    fn test_stable_ids_follow_enabled_order() {
        let entries = vec![
            WorldInfoEntry::new(["a"], "A"),
            WorldInfoEntry::new(["b"], "B").with_enabled(false),
            WorldInfoEntry::new(["c"], "C"),
        ];

        let prepared = prepare(&entries, &Environment::new());
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].id(), StableId(0));
        assert_eq!(prepared[1].id(), StableId(1));
        assert_eq!(prepared[1].entry.content, "C");
    }

    #[test]
    fn test_keys_expand_and_empty_keys_drop() {
        let env = Environment::new().with("char", "Bram");
        let entries = vec![WorldInfoEntry::new(["{{char}}", "{{noop}}", "sword"], "x")];

        let prepared = prepare(&entries, &env);
        assert_eq!(prepared[0].entry.keys, vec!["Bram", "sword"]);
        assert_eq!(prepared[0].predicate.keys.len(), 2);
    }

    #[test]
    fn test_placement_defaults() {
        let mut after = WorldInfoEntry::new(["a"], "A");
        after.position = CharPosition::AfterChar;
        let explicit = WorldInfoEntry::new(["b"], "B").with_extensions(EntryExtensions {
            position: Some(InsertionPosition::AtDepth),
            role: Some(PromptRole::User),
            ..EntryExtensions::default()
        });

        let prepared = prepare(
            &[WorldInfoEntry::new(["c"], "C"), after, explicit],
            &Environment::new(),
        );

        assert_eq!(prepared[0].entry.extensions.position, Some(InsertionPosition::Before));
        assert_eq!(prepared[0].entry.extensions.role, Some(PromptRole::System));
        assert_eq!(prepared[1].entry.extensions.position, Some(InsertionPosition::After));
        assert_eq!(prepared[2].entry.extensions.position, Some(InsertionPosition::AtDepth));
        assert_eq!(prepared[2].entry.extensions.role, Some(PromptRole::User));
    }

    #[test]
    fn test_entry_overrides_scan_settings() {
        let entry = WorldInfoEntry::new(["Rook"], "x").with_extensions(EntryExtensions {
            case_sensitive: Some(true),
            scan_depth: Some(1),
            ..EntryExtensions::default()
        });

        let prepared = prepare(&[entry], &Environment::new());
        let predicate = &prepared[0].predicate;
        assert_eq!(predicate.scan_depth, 1);
        assert!(predicate.keys.any_match("Rook"));
        assert!(!predicate.keys.any_match("rook"));
    }

    #[test]
    fn test_macro_failure_propagates() {
        let failing = |_: &str, _: &Environment, _: &ActivationMemory| {
            Err::<String, _>(MacroError::Failed("boom".to_string()))
        };

        let result = prepare_entries(
            &[WorldInfoEntry::new(["a"], "A")],
            &Environment::new(),
            &ActivationMemory::new(),
            &ScanSettings::default(),
            ProbabilityMode::Entropy,
            &failing,
            &SlashPatternParser,
        );

        assert!(matches!(result, Err(EngineError::Macro(MacroError::Failed(_)))));
    }

    #[test]
    fn test_source_entries_untouched() {
        let entries = vec![WorldInfoEntry::new(["{{user}}"], "Hi {{user}}")];
        let env = Environment::new().with("user", "Ann");

        let prepared = prepare(&entries, &env);
        assert_eq!(prepared[0].entry.keys, vec!["Ann"]);
        assert_eq!(entries[0].keys, vec!["{{user}}"]);
        assert!(entries[0].extensions.position.is_none());
    }
}
