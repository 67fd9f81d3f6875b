// Turn evaluator: does the local player have a pick to make right now?

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::lenient;
use crate::snapshot::RawSession;

/// Kind of a champion-select action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Pick,
    Ban,
    Other(String),
}

impl Default for ActionKind {
    fn default() -> Self {
        ActionKind::Other(String::new())
    }
}

impl ActionKind {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("pick") => ActionKind::Pick,
            Some("ban") => ActionKind::Ban,
            Some(other) => ActionKind::Other(other.to_string()),
            None => ActionKind::default(),
        }
    }
}

fn action_kind<'de, D>(deserializer: D) -> Result<ActionKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ActionKind::parse(lenient::opt_string(deserializer)?.as_deref()))
}

/// One entry of the action grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionRecord {
    #[serde(deserialize_with = "lenient::opt_i64")]
    pub actor_cell_id: Option<i64>,
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub completed: bool,
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub is_in_progress: bool,
    #[serde(rename = "type", deserialize_with = "action_kind")]
    pub kind: ActionKind,
    /// Champion already attached to the action; 0 means none yet.
    #[serde(deserialize_with = "lenient::i64_or_zero")]
    pub champion_id: i64,
}

impl ActionRecord {
    /// An open pick that belongs to `cell_id` and has no champion yet.
    pub fn is_open_pick_for(&self, cell_id: i64) -> bool {
        self.actor_cell_id == Some(cell_id)
            && !self.completed
            && self.is_in_progress
            && self.kind == ActionKind::Pick
            && self.champion_id == 0
    }
}

/// Flatten the action grid into a single list in document order.
///
/// The client sends an array of action groups (each an array of actions), but
/// a flat array or deeper nesting is accepted too. Anything that is not an
/// array or an action object is ignored.
pub fn flatten_actions(actions: &Value) -> Vec<ActionRecord> {
    let mut out = Vec::new();
    collect(actions, &mut out);
    out
}

fn collect(value: &Value, out: &mut Vec<ActionRecord>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(_) => out.push(ActionRecord::deserialize(value).unwrap_or_default()),
        _ => {}
    }
}

/// Whether the local player (at `local_cell_id`) currently has an open pick.
pub fn is_local_turn(raw: &RawSession, local_cell_id: Option<i64>) -> bool {
    let Some(cell_id) = local_cell_id else {
        return false;
    };
    if !raw.actions.is_array() {
        return false;
    }
    flatten_actions(&raw.actions)
        .iter()
        .any(|action| action.is_open_pick_for(cell_id))
}
