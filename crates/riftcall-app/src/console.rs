// Console output.
//
// Consumes `UiUpdate`s and prints them. The terminal is in raw mode while the
// key listener runs, so every line ends in "\r\n".

use std::io::Write;

use crossterm::style::Stylize;
use tokio::sync::mpsc;
use tracing::debug;

use riftcall_core::controller::{DropReason, TriggerReason};
use riftcall_core::normalize::NormalizedView;
use riftcall_core::ready_check::AcceptOutcome;
use riftcall_llm::prompt::parse_recommended_picks;

use crate::protocol::{ReadyCheckUpdate, UiUpdate};

const RULE_WIDTH: usize = 60;

/// Print updates until the channel closes.
pub async fn run<W: Write + Send>(mut ui_rx: mpsc::Receiver<UiUpdate>, mut out: W) -> anyhow::Result<()> {
    while let Some(update) = ui_rx.recv().await {
        for line in render(&update) {
            write!(out, "{line}\r\n")?;
        }
        out.flush()?;
    }
    debug!("UI channel closed, console exiting");
    Ok(())
}

/// The lines printed for one update.
pub fn render(update: &UiUpdate) -> Vec<String> {
    match update {
        UiUpdate::Connected { summoner } => vec![
            format!("{} Connected as {}", "✓".green(), summoner.as_str().bold()),
            "Waiting for champion select...".to_string(),
            format!(
                "Press {} for a recommendation at any time, {} to quit.",
                "r".bold(),
                "q".bold()
            ),
            String::new(),
        ],
        UiUpdate::SessionStarted(handle) => vec![
            "─".repeat(RULE_WIDTH),
            format!("Champion select started ({})", handle.label),
            "─".repeat(RULE_WIDTH),
        ],
        UiUpdate::SessionEnded {
            recommendations,
            saved_in,
            ..
        } => {
            let mut lines = vec![
                String::new(),
                "─".repeat(RULE_WIDTH),
                format!(
                    "Champion select ended after {recommendations} recommendation{}.",
                    if *recommendations == 1 { "" } else { "s" }
                ),
            ];
            if let Some(dir) = saved_in {
                lines.push(format!("Session saved to: {}", dir.display()));
            }
            lines.push("─".repeat(RULE_WIDTH));
            lines
        }
        UiUpdate::Thinking { reason, view } => render_board(*reason, view),
        UiUpdate::Recommendation { record, saved_to } => {
            let mut lines = vec!["─".repeat(RULE_WIDTH)];
            lines.extend(record.text.lines().map(str::to_string));
            lines.push("─".repeat(RULE_WIDTH));
            let picks = parse_recommended_picks(&record.text);
            if !picks.is_empty() {
                lines.push(format!("Top picks: {}", picks.join(", ")).green().bold().to_string());
            }
            if let Some(path) = saved_to {
                lines.push(format!("Saved to {}", path.display()).dark_grey().to_string());
            }
            lines
        }
        UiUpdate::RecommendationFailed { reason, message } => vec![format!(
            "{} {} recommendation failed: {}",
            "✗".red(),
            reason.label(),
            message
        )],
        UiUpdate::ManualIgnored(reason) => vec![match reason {
            DropReason::NoSnapshot => format!("{} No active champion select session", "✗".red()),
            DropReason::InFlight => "A recommendation is already on its way.".to_string(),
            DropReason::NoTeamData => "Nothing on the board yet.".to_string(),
        }],
        UiUpdate::ReadyCheck(update) => vec![render_ready_check(update)],
        UiUpdate::PollError(message) => {
            vec![format!("League client error: {message}").yellow().to_string()]
        }
    }
}

fn render_board(reason: TriggerReason, view: &NormalizedView) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "=".repeat(RULE_WIDTH),
        format!("CHAMPION SELECT UPDATE - {} - Phase: {}", reason.label(), view.phase)
            .bold()
            .to_string(),
        "=".repeat(RULE_WIDTH),
    ];
    if reason == TriggerReason::LocalTurn {
        lines.push("IT'S YOUR TURN TO PICK!".yellow().bold().to_string());
    }
    if let Some(role) = &view.local_role {
        lines.push(format!("Your Role: {role}"));
    }
    if !view.allies.is_empty() {
        lines.push("Allied Team:".cyan().to_string());
        for champ in &view.allies {
            let marker = if champ.is_local_player { " (YOU)" } else { "" };
            lines.push(format!("   • {} - {}{}", champ.display_name, champ.position, marker));
        }
    }
    if !view.enemies.is_empty() {
        lines.push("Enemy Team:".red().to_string());
        for champ in &view.enemies {
            lines.push(format!("   • {} - {}", champ.display_name, champ.position));
        }
    }
    if !view.bans.is_empty() {
        let names: Vec<&str> = view.bans.iter().map(|b| b.display_name.as_str()).collect();
        lines.push("Banned Champions:".dark_grey().to_string());
        lines.push(format!("   {}", names.join(", ")));
    }
    lines.push(String::new());
    lines.push("Getting AI recommendation...".italic().to_string());
    lines
}

fn render_ready_check(update: &ReadyCheckUpdate) -> String {
    match update {
        ReadyCheckUpdate::CountdownStarted { delay_secs } => {
            format!("Ready check! Accepting in {delay_secs}s...").yellow().to_string()
        }
        ReadyCheckUpdate::AlreadyAccepted => "Ready check already accepted.".to_string(),
        ReadyCheckUpdate::Finished(AcceptOutcome::Accepted) => {
            format!("{} Ready check accepted", "✓".green())
        }
        ReadyCheckUpdate::Finished(AcceptOutcome::Rejected) => {
            format!("{} Ready check accept was not taken", "✗".red())
        }
        ReadyCheckUpdate::Finished(AcceptOutcome::Failed(message)) => {
            format!("{} Failed to accept ready check: {}", "✗".red(), message)
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
