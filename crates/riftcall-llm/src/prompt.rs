// Prompt templates for champion pick recommendations.
//
// The user prompt lists what is on the board (allied team, enemy team, bans)
// and asks for three picks with a parseable summary line at the end.

use riftcall_core::champions::ChampionDirectory;
use riftcall_core::normalize::{NormalizedChampionRef, NormalizedView, Side};

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt for all recommendation calls.
pub fn system_prompt() -> String {
    "You are a League of Legends expert and coach. Your job is to analyze team \
     compositions and recommend the best champion picks. Provide concise, strategic \
     advice focused on synergy, counters, and win conditions."
        .to_string()
}

// ---------------------------------------------------------------------------
// Recommendation prompt
// ---------------------------------------------------------------------------

/// Build the user prompt for one view. Champions with a play-style note in
/// `directory` get it appended, since the model may not know them yet.
pub fn build_recommendation_prompt(view: &NormalizedView, directory: &ChampionDirectory) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("# League of Legends Champion Select Analysis\n\n");

    prompt.push_str("## Draft State\n");
    prompt.push_str(&format!("Phase: {}\n", view.phase));
    prompt.push_str(&format!(
        "My role: {}\n",
        view.local_role.as_deref().unwrap_or("Not specified")
    ));
    if view.local_side != Side::Unknown {
        prompt.push_str(&format!("My side: {}\n", view.local_side));
    }
    if let Some(mine) = &view.local_champion {
        prompt.push_str(&format!("My champion: {} (locked in)\n", mine.display_name));
    }
    prompt.push('\n');

    if !view.allies.is_empty() {
        prompt.push_str("## Allied Team:\n");
        for champ in &view.allies {
            prompt.push_str(&format_champion_line(champ, directory));
        }
        prompt.push('\n');
    }

    if !view.enemies.is_empty() {
        prompt.push_str("## Enemy Team:\n");
        for champ in &view.enemies {
            prompt.push_str(&format_champion_line(champ, directory));
        }
        prompt.push('\n');
    }

    if !view.bans.is_empty() {
        prompt.push_str("## Banned Champions:\n");
        for ban in &view.bans {
            prompt.push_str(&format!("- {}\n", ban.display_name));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Based on the team compositions above, recommend the top 3 champions I should pick. Consider:\n",
    );
    prompt.push_str("1. Synergy with my team composition\n");
    prompt.push_str("2. Countering enemy champions\n");
    prompt.push_str("3. Win conditions and team fight dynamics\n\n");
    prompt.push_str("Provide a brief explanation for each recommendation.\n");
    prompt.push_str(
        "At the end of your response, list only the recommended champion names in a \
         comma-separated format prefixed by 'Recommended Picks:'.\n",
    );
    prompt.push_str(
        "If I have already picked a champion and my role is jungle, tell me whether I \
         should path from top to bot or from bot to top based on the current team \
         compositions and enemy picks.\n",
    );

    prompt
}

fn format_champion_line(champ: &NormalizedChampionRef, directory: &ChampionDirectory) -> String {
    let mut line = format!("- {} ({}", champ.display_name, champ.position);
    if !champ.is_locked {
        line.push_str(", hovering");
    }
    line.push(')');
    if let Some(note) = directory.note(champ.champion_id) {
        line.push_str(&format!(": {note}"));
    }
    line.push('\n');
    line
}

/// Pull the champion names out of the trailing `Recommended Picks:` line, if
/// the model produced one.
pub fn parse_recommended_picks(text: &str) -> Vec<String> {
    const MARKER: &str = "recommended picks:";
    let Some(line) = text
        .lines()
        .rev()
        .find(|line| line.to_ascii_lowercase().contains(MARKER))
    else {
        return Vec::new();
    };
    let lower = line.to_ascii_lowercase();
    let Some(start) = lower.find(MARKER) else {
        return Vec::new();
    };
    line[start + MARKER.len()..]
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '*' || c == '.').trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
