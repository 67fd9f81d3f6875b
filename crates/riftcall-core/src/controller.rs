// Session lifecycle controller.
//
// Decides, per champion-select snapshot, whether a recommendation should be
// requested. The controller itself never awaits the recommendation: a
// `Trigger` decision hands a `TriggerRequest` to the driver, which runs
// `execute` wherever it likes and feeds the outcome back through `finish`.
// `in_flight` is held from the trigger until `finish`, so at most one request
// is ever outstanding.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::champions::ChampionDirectory;
use crate::fingerprint::{fingerprint, should_trigger, TriggerFingerprint};
use crate::normalize::{normalize, NormalizedView};
use crate::ports::{RecommendError, Recommender};
use crate::snapshot::RawSession;
use crate::turn::is_local_turn;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Identifies one champion-select session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionHandle {
    /// Start time, to the second.
    pub label: String,
    /// Ordinal of the session within this process. Tells apart sessions whose
    /// labels collide because they started within the same second.
    pub epoch: u64,
}

impl SessionHandle {
    pub fn generate(epoch: u64) -> Self {
        let now = chrono::Local::now();
        SessionHandle {
            label: now.format("%Y-%m-%dT%H-%M-%S").to_string(),
            epoch,
        }
    }

    /// Filesystem-safe name unique per session, e.g. `2025-01-31T20-15-04_s3`.
    pub fn dir_name(&self) -> String {
        format!("{}_s{}", self.label, self.epoch)
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.epoch)
    }
}

/// What caused a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerReason {
    /// The local player has an open pick and the state changed.
    LocalTurn,
    /// The user asked for one.
    Manual,
}

impl TriggerReason {
    pub fn label(self) -> &'static str {
        match self {
            TriggerReason::LocalTurn => "Your Turn",
            TriggerReason::Manual => "Manual Query",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            TriggerReason::LocalTurn => "your-turn",
            TriggerReason::Manual => "manual-query",
        }
    }
}

/// Work handed to the driver when the controller decides to trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRequest {
    pub session: SessionHandle,
    pub reason: TriggerReason,
    /// The full view, including the local player's own hover.
    pub view: NormalizedView,
    pub fingerprint: TriggerFingerprint,
    pub is_local_turn: bool,
}

/// Result of running a `TriggerRequest`.
#[derive(Debug, Clone)]
pub struct RecommendationOutcome {
    pub request: TriggerRequest,
    pub result: Result<String, RecommendError>,
}

/// A successful recommendation, ready for the persistence sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub session: SessionHandle,
    /// 1-based position of this recommendation within its session.
    pub sequence: u32,
    pub reason: TriggerReason,
    pub view: NormalizedView,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// A recommendation request is still outstanding.
    InFlight,
    /// Neither roster shows a champion yet.
    NoTeamData,
    /// A manual request arrived with no session snapshot to act on.
    NoSnapshot,
}

/// What the controller decided for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum PollDecision {
    /// No session before, none now.
    NoSession,
    /// The session that was active has ended.
    SessionEnded {
        handle: SessionHandle,
        recommendations: u32,
    },
    Dropped(DropReason),
    /// Nothing to request. `fingerprint_changed` reports whether the stored
    /// fingerprint moved.
    Suppressed {
        fingerprint_changed: bool,
        is_local_turn: bool,
    },
    Trigger(TriggerRequest),
}

/// What `finish` did with an outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Recorded(RecommendationRecord),
    Failed {
        reason: TriggerReason,
        error: RecommendError,
    },
    /// Succeeded, but for a session that has since ended.
    Stale,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything the controller remembers between polls. Reset when a session
/// ends; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLifecycleState {
    pub in_flight: bool,
    pub last_fingerprint: Option<TriggerFingerprint>,
    pub last_view: Option<NormalizedView>,
    /// Most recent snapshot, so a manual request can re-run the pipeline.
    pub last_snapshot: Option<RawSession>,
    /// Successful recommendations in the current session.
    pub sequence: u32,
    pub session: Option<SessionHandle>,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

pub struct SessionController {
    local_summoner_id: i64,
    directory: Arc<ChampionDirectory>,
    state: SessionLifecycleState,
    sessions_started: u64,
}

impl SessionController {
    pub fn new(local_summoner_id: i64, directory: Arc<ChampionDirectory>) -> Self {
        Self::with_state(local_summoner_id, directory, SessionLifecycleState::default())
    }

    /// Start from an arbitrary prior state.
    pub fn with_state(
        local_summoner_id: i64,
        directory: Arc<ChampionDirectory>,
        state: SessionLifecycleState,
    ) -> Self {
        SessionController {
            local_summoner_id,
            directory,
            state,
            sessions_started: 0,
        }
    }

    pub fn state(&self) -> &SessionLifecycleState {
        &self.state
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.state.session.as_ref()
    }

    /// Handle one polled snapshot. `None` means champion select is not active.
    pub fn on_snapshot(&mut self, raw: Option<RawSession>, manual: bool) -> PollDecision {
        let Some(raw) = raw else {
            return self.end_session();
        };
        if self.state.session.is_none() {
            self.begin_session();
        }
        self.state.last_snapshot = Some(raw);
        self.evaluate(manual)
    }

    /// Re-run the pipeline on the last snapshot as a manual request.
    pub fn on_manual_request(&mut self) -> PollDecision {
        if self.state.last_snapshot.is_none() {
            info!("Manual recommendation requested with no active champion select");
            return PollDecision::Dropped(DropReason::NoSnapshot);
        }
        self.evaluate(true)
    }

    /// Apply the outcome of a request produced by a `Trigger` decision.
    pub fn finish(&mut self, outcome: RecommendationOutcome) -> Completion {
        self.state.in_flight = false;
        let RecommendationOutcome { request, result } = outcome;

        let text = match result {
            Ok(text) => text,
            Err(error) => {
                warn!("Recommendation failed ({}): {}", request.reason.label(), error);
                return Completion::Failed {
                    reason: request.reason,
                    error,
                };
            }
        };

        if self.state.session.as_ref() != Some(&request.session) {
            info!(
                "Discarding recommendation for ended session {}",
                request.session
            );
            return Completion::Stale;
        }

        self.state.sequence += 1;
        if request.reason == TriggerReason::LocalTurn {
            self.state.last_fingerprint = Some(request.fingerprint.clone());
        }
        info!(
            "Recommendation #{} received ({})",
            self.state.sequence,
            request.reason.label()
        );

        Completion::Recorded(RecommendationRecord {
            session: request.session,
            sequence: self.state.sequence,
            reason: request.reason,
            view: request.view,
            text,
        })
    }

    fn begin_session(&mut self) {
        self.sessions_started += 1;
        let handle = SessionHandle::generate(self.sessions_started);
        info!("Champion select started: session {}", handle);
        self.state.session = Some(handle);
        self.state.sequence = 0;
    }

    fn end_session(&mut self) -> PollDecision {
        let Some(handle) = self.state.session.take() else {
            return PollDecision::NoSession;
        };
        let recommendations = self.state.sequence;
        info!(
            "Champion select ended: session {} ({} recommendations)",
            handle, recommendations
        );
        // in_flight survives: an outstanding request still completes via
        // `finish`, which will find the session gone.
        self.state.last_fingerprint = None;
        self.state.last_view = None;
        self.state.last_snapshot = None;
        self.state.sequence = 0;
        PollDecision::SessionEnded {
            handle,
            recommendations,
        }
    }

    fn evaluate(&mut self, manual: bool) -> PollDecision {
        if self.state.in_flight {
            debug!(manual, "Recommendation in flight, dropping snapshot");
            return PollDecision::Dropped(DropReason::InFlight);
        }

        let Some(raw) = self.state.last_snapshot.as_ref() else {
            return PollDecision::Dropped(DropReason::NoSnapshot);
        };
        let Some(view) = normalize(Some(raw), self.local_summoner_id, &self.directory) else {
            return PollDecision::Dropped(DropReason::NoSnapshot);
        };
        let local_turn = is_local_turn(raw, view.local_cell_id);
        self.state.last_view = Some(view.clone());

        if !view.has_team_data() && !manual {
            debug!("No champions on either team yet, skipping");
            return PollDecision::Dropped(DropReason::NoTeamData);
        }

        let current = fingerprint(&view, local_turn);
        let previous = self.state.last_fingerprint.as_ref();
        let wanted = should_trigger(previous, &current, manual) && (manual || local_turn);

        if !wanted {
            let fingerprint_changed = previous != Some(&current);
            if fingerprint_changed {
                debug!("State changed outside the local turn: {}", current);
                self.state.last_fingerprint = Some(current);
            }
            return PollDecision::Suppressed {
                fingerprint_changed,
                is_local_turn: local_turn,
            };
        }

        let Some(session) = self.state.session.clone() else {
            return PollDecision::Dropped(DropReason::NoSnapshot);
        };
        let reason = if manual {
            TriggerReason::Manual
        } else {
            TriggerReason::LocalTurn
        };
        info!("Triggering recommendation ({}), phase {}", reason.label(), view.phase);
        self.state.in_flight = true;

        PollDecision::Trigger(TriggerRequest {
            session,
            reason,
            view,
            fingerprint: current,
            is_local_turn: local_turn,
        })
    }
}

/// Run a trigger request against the recommender. The local player's own
/// hover is filtered out of what the recommender sees.
pub async fn execute(recommender: &dyn Recommender, request: TriggerRequest) -> RecommendationOutcome {
    let view = request.view.without_local_hover();
    let result = recommender.recommend(&view).await;
    RecommendationOutcome { request, result }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
