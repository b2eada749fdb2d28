//! Activation Predicate - answers "is this entry active now?" for one entry.

use lorebook::{ActivationMemory, ChatLogEntry, SelectiveLogic, StableId};

use super::RecursionBuffer;
use crate::matching::KeySet;

/// Why an entry did or did not activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Constant entry; matching skipped.
    Constant,
    /// Keys matched.
    Matched,
    /// Held active by its sticky window; no match required.
    Sticky,
    Rejected(Rejection),
}

impl Decision {
    /// True for every decision except a rejection.
    pub fn is_active(&self) -> bool {
        !matches!(self, Decision::Rejected(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The chat is shorter than the entry's delay.
    Delayed,
    /// Still inside the cooldown window.
    CoolingDown,
    /// Lost the probability roll.
    Probability,
    /// No primary key found.
    NoPrimaryMatch,
    /// Primary keys matched but the secondary keys did not satisfy the logic.
    SecondaryLogic,
}

/// The bound predicate of one entry: its compiled keys and timing rules.
#[derive(Debug, Clone)]
pub struct ActivationPredicate {
    pub id: StableId,
    pub keys: KeySet,
    pub secondary_keys: KeySet,
    pub logic: SelectiveLogic,
    pub scan_depth: usize,
    pub sticky: u32,
    pub cooldown: u32,
    pub delay: u32,
    pub exclude_recursion: bool,
    /// Outcome of this call's probability roll.
    pub probability_passed: bool,
}

impl ActivationPredicate {
    /// Evaluate the timing rules, the probability gate, then the keys.
    pub fn evaluate(
        &self,
        chat_log: &[ChatLogEntry],
        recursion: &RecursionBuffer,
        memory: &ActivationMemory,
    ) -> Decision {
        let chat_length = chat_log.len();
        let last_activated = memory.last_activated(self.id);

        if self.delay > 0 && chat_length < self.delay as usize {
            return Decision::Rejected(Rejection::Delayed);
        }

        if let Some(last) = last_activated {
            if self.sticky > 0 && last.saturating_add(self.sticky as usize) >= chat_length {
                return Decision::Sticky;
            }
            if self.cooldown > 0 && chat_length < last.saturating_add(self.cooldown as usize) {
                return Decision::Rejected(Rejection::CoolingDown);
            }
        }

        if !self.probability_passed {
            return Decision::Rejected(Rejection::Probability);
        }

        let text = self.searchable_text(chat_log, recursion);

        if !self.keys.any_match(&text) {
            return Decision::Rejected(Rejection::NoPrimaryMatch);
        }
        if self.secondary_keys.is_empty() || self.secondary_keys.satisfies(self.logic, &text) {
            Decision::Matched
        } else {
            Decision::Rejected(Rejection::SecondaryLogic)
        }
    }

    /// The last `scan_depth` messages, plus recursion text unless excluded.
    pub fn searchable_text(&self, chat_log: &[ChatLogEntry], recursion: &RecursionBuffer) -> String {
        let start = chat_log.len().saturating_sub(self.scan_depth);
        let mut text = chat_log[start..]
            .iter()
            .map(ChatLogEntry::render)
            .collect::<Vec<_>>()
            .join("\n");

        if !self.exclude_recursion {
            text.push('\n');
            text.push_str(&recursion.joined());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{MatchOptions, SlashPatternParser};

    fn keys(sources: &[&str]) -> KeySet {
        KeySet::compile(
            sources.iter().copied(),
            MatchOptions::default(),
            &SlashPatternParser,
        )
        .unwrap()
    }

    fn predicate(primary: &[&str]) -> ActivationPredicate {
        ActivationPredicate {
            id: StableId(0),
            keys: keys(primary),
            secondary_keys: KeySet::default(),
            logic: SelectiveLogic::AndAny,
            scan_depth: 4,
            sticky: 0,
            cooldown: 0,
            delay: 0,
            exclude_recursion: false,
            probability_passed: true,
        }
    }

    fn chat(lines: &[&str]) -> Vec<ChatLogEntry> {
        lines
            .iter()
            .map(|line| ChatLogEntry::new("user", "Ann", *line))
            .collect()
    }

    #[test]
    fn test_primary_match() {
        let p = predicate(&["tower"]);
        let memory = ActivationMemory::new();
        let empty = RecursionBuffer::default();

        assert_eq!(p.evaluate(&chat(&["the tower"]), &empty, &memory), Decision::Matched);
        assert_eq!(
            p.evaluate(&chat(&["the field"]), &empty, &memory),
            Decision::Rejected(Rejection::NoPrimaryMatch)
        );
    }

    #[test]
    fn test_scan_depth_limits_history() {
        let mut p = predicate(&["tower"]);
        p.scan_depth = 1;
        let log = chat(&["the tower", "later", "much later"]);

        assert_eq!(
            p.evaluate(&log, &RecursionBuffer::default(), &ActivationMemory::new()),
            Decision::Rejected(Rejection::NoPrimaryMatch)
        );
    }

    #[test]
    fn test_speaker_name_is_searchable() {
        let p = predicate(&["Ann"]);
        assert!(p
            .evaluate(&chat(&["hello"]), &RecursionBuffer::default(), &ActivationMemory::new())
            .is_active());
    }

    #[test]
    fn test_delay_blocks_short_chats() {
        let mut p = predicate(&["tower"]);
        p.delay = 3;
        let memory = ActivationMemory::new();
        let empty = RecursionBuffer::default();

        assert_eq!(
            p.evaluate(&chat(&["tower", "tower"]), &empty, &memory),
            Decision::Rejected(Rejection::Delayed)
        );
        assert_eq!(
            p.evaluate(&chat(&["tower", "tower", "tower"]), &empty, &memory),
            Decision::Matched
        );
    }

    #[test]
    fn test_sticky_requires_prior_activation() {
        let mut p = predicate(&["tower"]);
        p.sticky = 2;
        let log = chat(&["nothing", "here"]);
        let empty = RecursionBuffer::default();

        let fresh = ActivationMemory::new();
        assert!(!p.evaluate(&log, &empty, &fresh).is_active());

        let mut memory = ActivationMemory::new();
        memory.record_activation(StableId(0), 1);
        assert_eq!(p.evaluate(&log, &empty, &memory), Decision::Sticky);
    }

    #[test]
    fn test_cooldown_suppresses_match() {
        let mut p = predicate(&["tower"]);
        p.cooldown = 3;
        let mut memory = ActivationMemory::new();
        memory.record_activation(StableId(0), 2);
        let empty = RecursionBuffer::default();

        assert_eq!(
            p.evaluate(&chat(&["tower"; 4]), &empty, &memory),
            Decision::Rejected(Rejection::CoolingDown)
        );
        assert_eq!(p.evaluate(&chat(&["tower"; 5]), &empty, &memory), Decision::Matched);
    }

    #[test]
    fn test_lost_probability_roll() {
        let mut p = predicate(&["tower"]);
        p.probability_passed = false;
        assert_eq!(
            p.evaluate(&chat(&["tower"]), &RecursionBuffer::default(), &ActivationMemory::new()),
            Decision::Rejected(Rejection::Probability)
        );
    }

    #[test]
    fn test_secondary_logic() {
        let mut p = predicate(&["tower"]);
        p.secondary_keys = keys(&["a", "b"]);
        let memory = ActivationMemory::new();
        let empty = RecursionBuffer::default();

        let cases = [
            (SelectiveLogic::AndAll, "tower a b", true),
            (SelectiveLogic::AndAll, "tower a", false),
            (SelectiveLogic::AndAny, "tower b", true),
            (SelectiveLogic::AndAny, "tower", false),
            (SelectiveLogic::NotAny, "tower", true),
            (SelectiveLogic::NotAny, "tower a", false),
            (SelectiveLogic::NotAll, "tower a", true),
            (SelectiveLogic::NotAll, "tower a b", false),
        ];

        for (logic, line, expected) in cases {
            p.logic = logic;
            assert_eq!(
                p.evaluate(&chat(&[line]), &empty, &memory).is_active(),
                expected,
                "{:?} on {:?}",
                logic,
                line
            );
        }
    }

    #[test]
    fn test_recursion_text_and_exclusion() {
        let mut p = predicate(&["beacon"]);
        let mut buffer = RecursionBuffer::default();
        buffer.push("The beacon is lit.".to_string());
        let memory = ActivationMemory::new();

        assert_eq!(p.evaluate(&chat(&["dark"]), &buffer, &memory), Decision::Matched);

        p.exclude_recursion = true;
        assert_eq!(
            p.evaluate(&chat(&["dark"]), &buffer, &memory),
            Decision::Rejected(Rejection::NoPrimaryMatch)
        );
    }

    #[test]
    fn test_timing_windows_saturate_on_huge_memory() {
        let mut p = predicate(&["tower"]);
        p.sticky = 2;
        p.cooldown = 2;
        let mut memory = ActivationMemory::new();
        memory.record_activation(StableId(0), usize::MAX);

        assert_eq!(
            p.evaluate(&chat(&["dark"]), &RecursionBuffer::default(), &memory),
            Decision::Sticky
        );

        p.sticky = 0;
        assert_eq!(
            p.evaluate(&chat(&["tower"]), &RecursionBuffer::default(), &memory),
            Decision::Rejected(Rejection::CoolingDown)
        );
    }

    #[test]
    fn test_zero_scan_depth_searches_only_recursion_text() {
        let mut p = predicate(&["beacon"]);
        p.scan_depth = 0;
        let memory = ActivationMemory::new();
        let log = chat(&["the beacon"]);

        assert_eq!(
            p.evaluate(&log, &RecursionBuffer::default(), &memory),
            Decision::Rejected(Rejection::NoPrimaryMatch)
        );

        let mut buffer = RecursionBuffer::default();
        buffer.push("A beacon flares.".to_string());
        assert_eq!(p.evaluate(&log, &buffer, &memory), Decision::Matched);
    }
}
