//! The probability gate.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use lorebook::WorldInfoEntry;

/// Where probability draws come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityMode {
    /// A fresh draw from the thread RNG on every call.
    #[default]
    Entropy,
    /// A draw seeded from the entry's keys and content, identical on every call.
    Seeded,
}

/// Seed derived from the entry's keys, secondary keys and content.
fn entry_seed(entry: &WorldInfoEntry) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(entry.keys.join(",").as_bytes());
    hasher.update(entry.secondary_keys.join(",").as_bytes());
    hasher.update(entry.content.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Roll the gate once. Entries without `useProbability` always pass.
pub fn passes_probability_gate(entry: &WorldInfoEntry, mode: ProbabilityMode) -> bool {
    let ext = &entry.extensions;
    if !ext.use_probability {
        return true;
    }

    let draw: f64 = match mode {
        ProbabilityMode::Entropy => rand::rng().random(),
        ProbabilityMode::Seeded => StdRng::seed_from_u64(entry_seed(entry)).random(),
    };
    draw <= f64::from(ext.probability) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook::EntryExtensions;

    fn entry_with_probability(probability: u8) -> WorldInfoEntry {
        WorldInfoEntry::new(["coin"], "Heads or tails.").with_extensions(EntryExtensions {
            probability,
            use_probability: true,
            ..EntryExtensions::default()
        })
    }

    #[test]
    fn test_full_probability_always_passes() {
        let entry = entry_with_probability(100);
        for _ in 0..50 {
            assert!(passes_probability_gate(&entry, ProbabilityMode::Entropy));
        }
    }

    #[test]
    fn test_disabled_gate_passes() {
        let mut entry = entry_with_probability(0);
        entry.extensions.use_probability = false;
        assert!(passes_probability_gate(&entry, ProbabilityMode::Entropy));
    }

    #[test]
    fn test_zero_probability_blocks() {
        let entry = entry_with_probability(0);
        assert!(!passes_probability_gate(&entry, ProbabilityMode::Seeded));
    }

    #[test]
    fn test_seeded_mode_is_reproducible() {
        let entry = entry_with_probability(50);
        let first = passes_probability_gate(&entry, ProbabilityMode::Seeded);
        for _ in 0..10 {
            assert_eq!(passes_probability_gate(&entry, ProbabilityMode::Seeded), first);
        }
    }

    #[test]
    fn test_seed_depends_on_content() {
        let a = WorldInfoEntry::new(["coin"], "Heads.");
        let b = WorldInfoEntry::new(["coin"], "Tails.");
        assert_ne!(entry_seed(&a), entry_seed(&b));
        assert_eq!(entry_seed(&a), entry_seed(&a.clone()));
    }
}
