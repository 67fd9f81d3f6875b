// Trigger deduplication.
//
// A fingerprint captures the parts of a view that decide whether a new
// recommendation is worth asking for. Roster order is part of it: slot order
// follows position, so a reshuffle is a real change.

use std::fmt;

use serde::Serialize;

use crate::normalize::NormalizedView;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TriggerFingerprint {
    pub allies: Vec<i64>,
    pub enemies: Vec<i64>,
    pub bans: Vec<i64>,
    pub phase: String,
    pub is_local_turn: bool,
}

impl fmt::Display for TriggerFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allies={:?} enemies={:?} bans={:?} phase={} turn={}",
            self.allies, self.enemies, self.bans, self.phase, self.is_local_turn
        )
    }
}

pub fn fingerprint(view: &NormalizedView, is_local_turn: bool) -> TriggerFingerprint {
    TriggerFingerprint {
        allies: view.allies.iter().map(|c| c.champion_id).collect(),
        enemies: view.enemies.iter().map(|c| c.champion_id).collect(),
        bans: view.bans.iter().map(|b| b.champion_id).collect(),
        phase: view.phase.clone(),
        is_local_turn,
    }
}

/// Manual requests always go through; otherwise only a changed (or first)
/// fingerprint does.
pub fn should_trigger(
    previous: Option<&TriggerFingerprint>,
    current: &TriggerFingerprint,
    manual_override: bool,
) -> bool {
    manual_override || previous != Some(current)
}
