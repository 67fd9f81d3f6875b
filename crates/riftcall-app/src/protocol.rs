// Messages passed between the pipelines, the console and the key listener.

use std::path::PathBuf;

use riftcall_core::controller::{DropReason, RecommendationRecord, SessionHandle, TriggerReason};
use riftcall_core::normalize::NormalizedView;
use riftcall_core::ready_check::AcceptOutcome;

/// Commands from the key listener to the champion-select loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    RequestRecommendation,
    Quit,
}

/// Ready-check events worth telling the user about. A countdown dropped
/// because the check went away is not one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadyCheckUpdate {
    CountdownStarted { delay_secs: u64 },
    AlreadyAccepted,
    Finished(AcceptOutcome),
}

/// Everything the console prints.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Connected {
        summoner: String,
    },
    SessionStarted(SessionHandle),
    SessionEnded {
        handle: SessionHandle,
        recommendations: u32,
        /// Where the session's files went, if anything was written.
        saved_in: Option<PathBuf>,
    },
    /// A recommendation was requested; shows the board it was asked about.
    Thinking {
        reason: TriggerReason,
        view: Box<NormalizedView>,
    },
    Recommendation {
        record: Box<RecommendationRecord>,
        saved_to: Option<PathBuf>,
    },
    RecommendationFailed {
        reason: TriggerReason,
        message: String,
    },
    /// A manual request that could not be served.
    ManualIgnored(DropReason),
    ReadyCheck(ReadyCheckUpdate),
    PollError(String),
}
