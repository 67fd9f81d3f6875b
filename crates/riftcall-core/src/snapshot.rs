// Raw snapshot types as served by the League client API.
//
// These mirror `/lol-champ-select/v1/session` and
// `/lol-matchmaking/v1/ready-check`. Every field is optional on the wire, so
// all of them go through the `lenient` deserializers: a snapshot always
// parses, and malformed fields simply read as absent.

use serde::Deserialize;
use serde_json::Value;

use crate::lenient;

// ---------------------------------------------------------------------------
// Champion select
// ---------------------------------------------------------------------------

/// One champion-select session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSession {
    #[serde(deserialize_with = "lenient::seq")]
    pub my_team: Vec<RosterEntry>,
    #[serde(deserialize_with = "lenient::seq")]
    pub their_team: Vec<RosterEntry>,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub bans: BanSet,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub timer: Timer,
    /// The action grid, kept raw. Usually an array of arrays of action
    /// objects; see `turn::flatten_actions`.
    pub actions: Value,
}

impl RawSession {
    /// Parse a snapshot from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// A single roster slot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RosterEntry {
    /// Locked champion; 0 or absent when nothing is locked.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub champion_id: Option<i64>,
    /// Hovered champion (the client calls it the pick intent).
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub champion_pick_intent: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub assigned_position: Option<String>,
    #[serde(deserialize_with = "lenient::i64_or_zero")]
    pub cell_id: i64,
    /// Side code: 100 for blue, 200 for red.
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub team: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub summoner_id: Option<i64>,
}

/// What a roster slot currently shows. A lock always wins over a hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChoice {
    Locked(i64),
    Hovered(i64),
    Empty,
}

impl RosterEntry {
    pub fn choice(&self) -> SlotChoice {
        match (self.champion_id, self.champion_pick_intent) {
            (Some(id), _) if id > 0 => SlotChoice::Locked(id),
            (_, Some(id)) if id > 0 => SlotChoice::Hovered(id),
            _ => SlotChoice::Empty,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BanSet {
    #[serde(deserialize_with = "lenient::id_list")]
    pub my_team_bans: Vec<i64>,
    #[serde(deserialize_with = "lenient::id_list")]
    pub their_team_bans: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timer {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub phase: Option<String>,
}

// ---------------------------------------------------------------------------
// Ready check
// ---------------------------------------------------------------------------

/// Matchmaking ready-check snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadyCheckState {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub player_response: Option<String>,
}

/// The local player's answer to a ready check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyCheckResponse {
    /// Not answered yet.
    None,
    Accepted,
    /// Declined, or anything the client adds later. Absent reads as `Other("")`.
    Other(String),
}

impl ReadyCheckState {
    pub fn is_in_progress(&self) -> bool {
        self.state.as_deref() == Some("InProgress")
    }

    pub fn response(&self) -> ReadyCheckResponse {
        match self.player_response.as_deref() {
            Some("None") => ReadyCheckResponse::None,
            Some("Accepted") => ReadyCheckResponse::Accepted,
            Some(other) => ReadyCheckResponse::Other(other.to_string()),
            None => ReadyCheckResponse::Other(String::new()),
        }
    }
}
