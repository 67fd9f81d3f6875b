// Key listener.
//
// Puts the terminal in raw mode and turns key presses into `UserCommand`s:
// `r` asks for a recommendation, `q` or Ctrl+C quits. Raw mode swallows the
// usual SIGINT, hence the explicit Ctrl+C mapping.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::UserCommand;

/// Restores cooked mode when dropped.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

pub fn map_key(key: &KeyEvent) -> Option<UserCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Some(UserCommand::RequestRecommendation),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Forward key presses until the user quits or the receiver goes away.
pub async fn run(cmd_tx: mpsc::Sender<UserCommand>) -> anyhow::Result<()> {
    let _raw = RawModeGuard::enable()?;
    let mut events = EventStream::new();

    while let Some(event) = events.next().await {
        let event = event?;
        let Event::Key(key) = event else {
            continue;
        };
        let Some(cmd) = map_key(&key) else {
            continue;
        };
        debug!(?cmd, "key command");
        if cmd_tx.send(cmd).await.is_err() {
            info!("Command channel closed, key listener exiting");
            break;
        }
        if cmd == UserCommand::Quit {
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
