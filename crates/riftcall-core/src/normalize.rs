// Session normalizer: raw champion-select snapshot -> structured view.

use std::fmt;

use serde::Serialize;

use crate::champions::ChampionDirectory;
use crate::snapshot::{RawSession, RosterEntry, SlotChoice};

/// Phase string used when the snapshot carries no timer phase.
pub const UNKNOWN_PHASE: &str = "UNKNOWN";

/// Position label used when a roster slot has no assigned position.
pub const UNKNOWN_POSITION: &str = "Unknown";

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// A champion shown in a roster slot, locked or hovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedChampionRef {
    pub champion_id: i64,
    pub display_name: String,
    pub position: String,
    pub is_local_player: bool,
    pub is_locked: bool,
    /// Only meaningful when `is_locked` is false.
    pub is_hovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannedChampion {
    pub champion_id: i64,
    pub display_name: String,
}

/// Map side the local team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Blue,
    Red,
    Unknown,
}

impl Side {
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(100) => Side::Blue,
            Some(200) => Side::Red,
            _ => Side::Unknown,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Side::Blue => "Blue",
            Side::Red => "Red",
            Side::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Structured view of one champion-select snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedView {
    pub allies: Vec<NormalizedChampionRef>,
    pub enemies: Vec<NormalizedChampionRef>,
    pub bans: Vec<BannedChampion>,
    pub local_role: Option<String>,
    pub local_side: Side,
    /// The local player's locked champion, if any.
    pub local_champion: Option<NormalizedChampionRef>,
    pub phase: String,
    pub is_ban_phase: bool,
    pub is_pick_phase: bool,
    pub local_cell_id: Option<i64>,
}

impl NormalizedView {
    pub fn has_team_data(&self) -> bool {
        !self.allies.is_empty() || !self.enemies.is_empty()
    }

    /// A copy without the local player's own hovered-but-unlocked slot, so
    /// the recommendation is not anchored on the player's indecision.
    pub fn without_local_hover(&self) -> NormalizedView {
        let mut view = self.clone();
        view.allies
            .retain(|champ| !(champ.is_local_player && !champ.is_locked));
        view
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a snapshot for the participant identified by `local_summoner_id`.
///
/// Returns `None` when there is no snapshot (champion select not active).
/// Never fails: missing fields fall back to defaults.
pub fn normalize(
    raw: Option<&RawSession>,
    local_summoner_id: i64,
    directory: &ChampionDirectory,
) -> Option<NormalizedView> {
    let raw = raw?;

    let local = raw
        .my_team
        .iter()
        .find(|entry| entry.summoner_id == Some(local_summoner_id));
    let local_cell_id = local.map(|entry| entry.cell_id);
    let local_role = local.and_then(|entry| entry.assigned_position.clone());
    let local_side = Side::from_code(local.and_then(|entry| entry.team));

    let allies: Vec<NormalizedChampionRef> = raw
        .my_team
        .iter()
        .filter_map(|entry| {
            let is_local = local_cell_id == Some(entry.cell_id);
            champion_ref(entry, is_local, directory)
        })
        .collect();
    let enemies: Vec<NormalizedChampionRef> = raw
        .their_team
        .iter()
        .filter_map(|entry| champion_ref(entry, false, directory))
        .collect();

    let bans = raw
        .bans
        .my_team_bans
        .iter()
        .chain(raw.bans.their_team_bans.iter())
        .filter(|id| **id > 0)
        .map(|id| BannedChampion {
            champion_id: *id,
            display_name: directory.resolve_name(*id),
        })
        .collect();

    let phase = raw
        .timer
        .phase
        .clone()
        .unwrap_or_else(|| UNKNOWN_PHASE.to_string());
    let (is_ban_phase, is_pick_phase) = classify_phase(&phase);

    let local_champion = allies
        .iter()
        .find(|champ| champ.is_local_player && champ.is_locked)
        .cloned();

    Some(NormalizedView {
        allies,
        enemies,
        bans,
        local_role,
        local_side,
        local_champion,
        phase,
        is_ban_phase,
        is_pick_phase,
        local_cell_id,
    })
}

/// `(is_ban_phase, is_pick_phase)`. Both can hold at once, e.g. `BAN_PICK`.
pub fn classify_phase(phase: &str) -> (bool, bool) {
    let is_ban = phase == "BAN_PICK" || phase.contains("BAN");
    let is_pick = phase.contains("PICK") || phase == "FINALIZATION";
    (is_ban, is_pick)
}

fn champion_ref(
    entry: &RosterEntry,
    is_local_player: bool,
    directory: &ChampionDirectory,
) -> Option<NormalizedChampionRef> {
    let (champion_id, is_locked) = match entry.choice() {
        SlotChoice::Locked(id) => (id, true),
        SlotChoice::Hovered(id) => (id, false),
        SlotChoice::Empty => return None,
    };
    Some(NormalizedChampionRef {
        champion_id,
        display_name: directory.resolve_name(champion_id),
        position: entry
            .assigned_position
            .clone()
            .unwrap_or_else(|| UNKNOWN_POSITION.to_string()),
        is_local_player,
        is_locked,
        is_hovered: !is_locked,
    })
}
