// Ready-check automator.
//
// When matchmaking pops a ready check the player has not answered, start a
// countdown; when it runs out, accept on the player's behalf. Any answer the
// player gives in the meantime, or the check going away, cancels it.
//
// The countdown is just a deadline held in `AutomatorState`. The driver
// sleeps until `deadline()` and then calls `fire`; cancelling is resetting
// the state to `Idle`, with nothing to tear down.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::ports::ReadyCheckAcceptor;
use crate::snapshot::{ReadyCheckResponse, ReadyCheckState};

pub const DEFAULT_ACCEPT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatorState {
    Idle,
    PendingAccept { started_at: Instant },
}

/// Result of observing one ready-check snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCheckEvent {
    Unchanged,
    CountdownStarted { deadline: Instant },
    /// The player accepted before the countdown ran out.
    AlreadyAccepted,
    /// The check ended, was answered otherwise, or disappeared.
    Cancelled,
}

/// Result of issuing the accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    /// The client answered but did not take the accept.
    Rejected,
    Failed(String),
}

#[derive(Debug)]
pub struct ReadyCheckAutomator {
    state: AutomatorState,
    delay: Duration,
}

impl Default for ReadyCheckAutomator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPT_DELAY)
    }
}

impl ReadyCheckAutomator {
    pub fn new(delay: Duration) -> Self {
        ReadyCheckAutomator {
            state: AutomatorState::Idle,
            delay,
        }
    }

    pub fn state(&self) -> AutomatorState {
        self.state
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the pending accept is due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            AutomatorState::PendingAccept { started_at } => Some(started_at + self.delay),
            AutomatorState::Idle => None,
        }
    }

    pub fn observe(&mut self, snapshot: Option<&ReadyCheckState>, now: Instant) -> ReadyCheckEvent {
        match self.state {
            AutomatorState::Idle => match snapshot {
                Some(check)
                    if check.is_in_progress() && check.response() == ReadyCheckResponse::None =>
                {
                    self.state = AutomatorState::PendingAccept { started_at: now };
                    info!(
                        "Ready check detected, accepting in {}s",
                        self.delay.as_secs_f32()
                    );
                    ReadyCheckEvent::CountdownStarted {
                        deadline: now + self.delay,
                    }
                }
                _ => ReadyCheckEvent::Unchanged,
            },
            AutomatorState::PendingAccept { .. } => {
                let Some(check) = snapshot else {
                    self.state = AutomatorState::Idle;
                    return ReadyCheckEvent::Cancelled;
                };
                match check.response() {
                    ReadyCheckResponse::Accepted => {
                        self.state = AutomatorState::Idle;
                        info!("Ready check already accepted");
                        ReadyCheckEvent::AlreadyAccepted
                    }
                    ReadyCheckResponse::None if check.is_in_progress() => ReadyCheckEvent::Unchanged,
                    _ => {
                        self.state = AutomatorState::Idle;
                        ReadyCheckEvent::Cancelled
                    }
                }
            }
        }
    }

    /// Issue the accept if the countdown has run out. Returns `None` when
    /// nothing was due. The automator is back to `Idle` afterwards whatever
    /// the acceptor says.
    pub async fn fire(
        &mut self,
        acceptor: &dyn ReadyCheckAcceptor,
        now: Instant,
    ) -> Option<AcceptOutcome> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.state = AutomatorState::Idle;

        let outcome = match acceptor.accept_ready_check().await {
            Ok(true) => {
                info!("Ready check accepted");
                AcceptOutcome::Accepted
            }
            Ok(false) => {
                warn!("Ready check accept was not taken by the client");
                AcceptOutcome::Rejected
            }
            Err(e) => {
                warn!("Failed to accept ready check: {:#}", e);
                AcceptOutcome::Failed(e.to_string())
            }
        };
        Some(outcome)
    }
}
