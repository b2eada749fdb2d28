//! Orchestrator - the public entry point of the activation engine.
//!
//! One call:
//! 1. **Copy**: deep-copy the enabled entries and give each a stable id
//! 2. **Prepare**: expand keys, fill defaults, compile matchers, roll probability
//! 3. **Schedule**: run recursion levels to their fixed points
//! 4. **Commit**: write timing state back to the caller's memory
//!
//! Memory is only updated when the whole call succeeds.

mod predicate;
mod prepared;
mod probability;
mod scheduler;

pub use predicate::*;
pub use prepared::*;
pub use probability::*;
pub use scheduler::*;

use lorebook::{ActivationMemory, ChatLogEntry, Environment, ScanSettings, WorldInfoEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::macros::{BasicMacroExpander, MacroExpander};
use crate::matching::{PatternLiteralParser, SlashPatternParser};

/// Configuration for an activation engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Global scan defaults; entries may override each field.
    pub scan: ScanSettings,

    pub probability: ProbabilityMode,

    /// Drop every still-pending `exclude_recursion` entry after each pass
    /// instead of keeping it eligible for later passes and levels.
    pub prune_excluded_after_pass: bool,
}

/// An activated entry with its scheduling details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivatedEntry {
    /// The entry with expanded keys and content.
    pub entry: WorldInfoEntry,
    pub activation: Activation,
}

/// Result of one activation call, in activation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationReport {
    pub activated: Vec<ActivatedEntry>,
}

impl ActivationReport {
    /// Number of activated entries.
    pub fn len(&self) -> usize {
        self.activated.len()
    }

    /// True when nothing activated.
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty()
    }

    /// Drop scheduling details and keep the entries.
    pub fn into_entries(self) -> Vec<WorldInfoEntry> {
        self.activated.into_iter().map(|a| a.entry).collect()
    }

    /// Expanded contents in activation order.
    pub fn contents(&self) -> Vec<&str> {
        self.activated
            .iter()
            .map(|a| a.entry.content.as_str())
            .collect()
    }
}

/// Decides which world-info entries are active for a turn.
pub struct ActivationEngine<E = BasicMacroExpander, P = SlashPatternParser> {
    config: ActivationConfig,
    expander: E,
    parser: P,
}

impl ActivationEngine {
    /// Create an engine with the built-in macro expander and literal parser.
    pub fn new(config: ActivationConfig) -> Self {
        Self::with_collaborators(config, BasicMacroExpander::new(), SlashPatternParser)
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ActivationConfig::default())
    }
}

impl<E: MacroExpander, P: PatternLiteralParser> ActivationEngine<E, P> {
    /// Create an engine with caller-supplied collaborators.
    pub fn with_collaborators(config: ActivationConfig, expander: E, parser: P) -> Self {
        Self {
            config,
            expander,
            parser,
        }
    }

    /// The configuration this engine runs with.
    pub fn config(&self) -> &ActivationConfig {
        &self.config
    }

    /// Return the activated entries for this turn, updating `memory`.
    pub fn activate(
        &self,
        entries: &[WorldInfoEntry],
        chat_log: &[ChatLogEntry],
        env: &Environment,
        memory: &mut ActivationMemory,
    ) -> EngineResult<Vec<WorldInfoEntry>> {
        Ok(self
            .activate_with_report(entries, chat_log, env, memory)?
            .into_entries())
    }

    /// Like [`activate`](Self::activate), keeping per-entry scheduling details.
    pub fn activate_with_report(
        &self,
        entries: &[WorldInfoEntry],
        chat_log: &[ChatLogEntry],
        env: &Environment,
        memory: &mut ActivationMemory,
    ) -> EngineResult<ActivationReport> {
        // Work on a copy so a failed call leaves the caller's memory as it was.
        let mut working = memory.clone();

        let mut prepared = prepare_entries(
            entries,
            env,
            &working,
            &self.config.scan,
            self.config.probability,
            &self.expander,
            &self.parser,
        )?;

        let scheduler = RecursionScheduler::new(
            &mut prepared,
            SchedulerOptions {
                prune_excluded_after_pass: self.config.prune_excluded_after_pass,
            },
        );
        let levels = scheduler.levels();
        let activations = scheduler.run(chat_log, env, &mut working, &self.expander)?;

        *memory = working;

        debug!(
            session = %memory.session,
            chat_length = chat_log.len(),
            entries = prepared.len(),
            levels = levels.len(),
            activated = activations.len(),
            "world-info activation finished"
        );

        let mut slots: Vec<Option<PreparedEntry>> = prepared.into_iter().map(Some).collect();
        let activated = activations
            .into_iter()
            .filter_map(|activation| {
                slots[activation.id.0].take().map(|prepared| ActivatedEntry {
                    entry: prepared.entry,
                    activation,
                })
            })
            .collect();

        Ok(ActivationReport { activated })
    }
}

/// Activate entries with the built-in collaborators.
///
/// ```
/// use lore_engine::{get_activated_world_info_entries, ActivationConfig};
/// use lorebook::{ActivationMemory, ChatLogEntry, Environment, WorldInfoEntry};
///
/// let entries = vec![WorldInfoEntry::new(["lighthouse"], "The lighthouse keeper is blind.")];
/// let chat = vec![ChatLogEntry::new("user", "Ann", "Is the lighthouse still lit?")];
/// let mut memory = ActivationMemory::new();
///
/// let active = get_activated_world_info_entries(
///     &entries,
///     &chat,
///     &Environment::new(),
///     &mut memory,
///     ActivationConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(active.len(), 1);
/// ```
pub fn get_activated_world_info_entries(
    entries: &[WorldInfoEntry],
    chat_log: &[ChatLogEntry],
    env: &Environment,
    memory: &mut ActivationMemory,
    config: ActivationConfig,
) -> EngineResult<Vec<WorldInfoEntry>> {
    ActivationEngine::new(config).activate(entries, chat_log, env, memory)
}
