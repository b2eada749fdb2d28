//! Recursion Scheduler - drives passes and levels so injected content can
//! trigger further entries within the same call.
//!
//! Entries live in a fixed arena for the whole call. Membership in the pending
//! pool is tracked by a parallel state vector; nothing is ever removed or
//! renumbered, so stable ids stay valid across passes.

use std::collections::BTreeSet;

use lorebook::{ActivationMemory, ChatLogEntry, Environment, StableId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::predicate::Decision;
use super::prepared::PreparedEntry;
use crate::error::EngineResult;
use crate::macros::MacroExpander;

/// Expanded content of activated entries, searchable by later entries.
#[derive(Debug, Clone, Default)]
pub struct RecursionBuffer {
    contents: Vec<String>,
}

impl RecursionBuffer {
    /// Append an activated entry's expanded content.
    pub fn push(&mut self, content: String) {
        self.contents.push(content);
    }

    /// All contents, newline-separated.
    pub fn joined(&self) -> String {
        self.contents.join("\n")
    }

    /// Number of contributed contents.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// True before any entry has contributed.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Pending,
    Activated,
    /// Left the pool without activating.
    Dropped,
}

/// When and how an entry activated during one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub id: StableId,
    /// Recursion level being processed.
    pub level: u32,
    /// Pass number within that level, starting at 1.
    pub pass: usize,
    /// Held by its sticky window rather than a fresh match.
    pub sticky: bool,
}

/// Scheduling options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerOptions {
    /// Drop every still-pending `exclude_recursion` entry after each pass.
    pub prune_excluded_after_pass: bool,
}

pub struct RecursionScheduler<'a> {
    entries: &'a mut [PreparedEntry],
    states: Vec<SlotState>,
    buffer: RecursionBuffer,
    options: SchedulerOptions,
}

impl<'a> RecursionScheduler<'a> {
    /// Put every prepared entry in the pending pool.
    pub fn new(entries: &'a mut [PreparedEntry], options: SchedulerOptions) -> Self {
        let states = vec![SlotState::Pending; entries.len()];
        Self {
            entries,
            states,
            buffer: RecursionBuffer::default(),
            options,
        }
    }

    /// Distinct recursion levels across all entries, ascending.
    pub fn levels(&self) -> Vec<u32> {
        self.entries
            .iter()
            .map(PreparedEntry::recursion_level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Run every level to its fixed point.
    ///
    /// Activated entries get their content macro-expanded in place. Returns
    /// activations in the order they happened.
    pub fn run(
        mut self,
        chat_log: &[ChatLogEntry],
        env: &Environment,
        memory: &mut ActivationMemory,
        expander: &dyn MacroExpander,
    ) -> EngineResult<Vec<Activation>> {
        let mut activations = Vec::new();

        for level in self.levels() {
            let mut pass = 0;
            loop {
                pass += 1;
                let newly = self.run_pass(level, pass, chat_log, env, memory, expander)?;
                trace!(level, pass, activated = newly.len(), "world-info pass finished");

                if self.options.prune_excluded_after_pass {
                    self.prune_excluded();
                }

                if newly.is_empty() {
                    break;
                }
                for activation in &newly {
                    let entry = &self.entries[activation.id.0].entry;
                    if !entry.extensions.prevent_recursion {
                        self.buffer.push(entry.content.clone());
                    }
                }
                activations.extend(newly);
            }
        }

        Ok(activations)
    }

    fn run_pass(
        &mut self,
        level: u32,
        pass: usize,
        chat_log: &[ChatLogEntry],
        env: &Environment,
        memory: &mut ActivationMemory,
        expander: &dyn MacroExpander,
    ) -> EngineResult<Vec<Activation>> {
        let mut newly = Vec::new();

        for slot in 0..self.entries.len() {
            if self.states[slot] != SlotState::Pending {
                continue;
            }
            let prepared = &self.entries[slot];
            if prepared.recursion_level() > level {
                continue;
            }

            let decision = if prepared.entry.constant {
                Decision::Constant
            } else {
                prepared.predicate.evaluate(chat_log, &self.buffer, memory)
            };
            trace!(entry = %prepared.id(), level, pass, ?decision, "evaluated world-info entry");

            if !decision.is_active() {
                continue;
            }

            let id = prepared.id();
            memory.record_activation(id, chat_log.len());

            let prepared = &mut self.entries[slot];
            prepared.entry.content = expander.expand(&prepared.entry.content, env, memory)?;
            self.states[slot] = SlotState::Activated;

            newly.push(Activation {
                id,
                level,
                pass,
                sticky: decision == Decision::Sticky,
            });
        }

        Ok(newly)
    }

    fn prune_excluded(&mut self) {
        for (slot, prepared) in self.entries.iter().enumerate() {
            if self.states[slot] == SlotState::Pending && prepared.entry.extensions.exclude_recursion {
                self.states[slot] = SlotState::Dropped;
            }
        }
    }
}
