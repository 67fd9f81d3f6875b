// Champion-select pipeline: the main event loop.
//
// Listens on four sources with `tokio::select!`:
// 1. the poll timer, which spawns a tagged snapshot fetch
// 2. fetch results, applied in request order through `PollSequencer`
// 3. recommendation outcomes from the spawned recommendation task
// 4. user commands from the key listener
//
// All decisions are made by `SessionController`; this loop only moves data
// between it, the collaborators and the console.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use riftcall_core::controller::{
    execute, Completion, PollDecision, RecommendationOutcome, SessionController,
};
use riftcall_core::poll::PollSequencer;
use riftcall_core::ports::{RecommendationSink, Recommender, SnapshotSource};
use riftcall_core::snapshot::RawSession;

use crate::protocol::{UiUpdate, UserCommand};

type PollResult = (u64, anyhow::Result<Option<RawSession>>);

/// Collaborators of the champion-select loop.
pub struct ChampSelectPipeline {
    pub source: Arc<dyn SnapshotSource>,
    pub recommender: Arc<dyn Recommender>,
    pub sink: Arc<dyn RecommendationSink>,
    pub poll_interval: Duration,
}

// ---------------------------------------------------------------------------
// Loop state
// ---------------------------------------------------------------------------

struct LoopState {
    controller: SessionController,
    recommender: Arc<dyn Recommender>,
    sink: Arc<dyn RecommendationSink>,
    ui_tx: mpsc::Sender<UiUpdate>,
    outcome_tx: mpsc::Sender<RecommendationOutcome>,
    recommendation_task: Option<JoinHandle<()>>,
    /// Last poll error shown, so a closed client is reported once rather
    /// than every poll.
    last_poll_error: Option<String>,
}

impl LoopState {
    async fn notify(&self, update: UiUpdate) {
        if self.ui_tx.send(update).await.is_err() {
            debug!("UI channel closed, dropping update");
        }
    }

    async fn apply_snapshot(&mut self, snapshot: Option<RawSession>) {
        let before = self.controller.session().cloned();
        let decision = self.controller.on_snapshot(snapshot, false);
        if let Some(handle) = self.controller.session() {
            if before.as_ref() != Some(handle) {
                let handle = handle.clone();
                self.notify(UiUpdate::SessionStarted(handle)).await;
            }
        }
        self.handle_decision(decision, false).await;
    }

    async fn handle_decision(&mut self, decision: PollDecision, manual: bool) {
        match decision {
            PollDecision::NoSession => {}
            PollDecision::SessionEnded {
                handle,
                recommendations,
            } => {
                let saved_in = self.sink.session_location(&handle);
                self.notify(UiUpdate::SessionEnded {
                    handle,
                    recommendations,
                    saved_in,
                })
                .await;
            }
            PollDecision::Dropped(reason) => {
                if manual {
                    self.notify(UiUpdate::ManualIgnored(reason)).await;
                }
            }
            PollDecision::Suppressed { .. } => {}
            PollDecision::Trigger(request) => {
                self.notify(UiUpdate::Thinking {
                    reason: request.reason,
                    view: Box::new(request.view.clone()),
                })
                .await;

                let recommender = Arc::clone(&self.recommender);
                let tx = self.outcome_tx.clone();
                let handle = tokio::spawn(async move {
                    let outcome = execute(recommender.as_ref(), request).await;
                    if tx.send(outcome).await.is_err() {
                        debug!("Outcome channel closed before recommendation finished");
                    }
                });
                self.recommendation_task = Some(handle);
            }
        }
    }

    async fn handle_outcome(&mut self, outcome: RecommendationOutcome) {
        self.recommendation_task = None;
        match self.controller.finish(outcome) {
            Completion::Recorded(record) => {
                let saved_to = match self.sink.record(&record).await {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Failed to save recommendation: {:#}", e);
                        None
                    }
                };
                self.notify(UiUpdate::Recommendation {
                    record: Box::new(record),
                    saved_to,
                })
                .await;
            }
            Completion::Failed { reason, error } => {
                self.notify(UiUpdate::RecommendationFailed {
                    reason,
                    message: error.to_string(),
                })
                .await;
            }
            Completion::Stale => {
                debug!("Recommendation arrived after its session ended");
            }
        }
    }

    async fn handle_poll_error(&mut self, error: anyhow::Error) {
        let message = format!("{error:#}");
        warn!("Champion select poll failed: {}", message);
        if self.last_poll_error.as_deref() != Some(message.as_str()) {
            self.last_poll_error = Some(message.clone());
            self.notify(UiUpdate::PollError(message)).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the champion-select loop until a `Quit` command arrives or the
/// command channel closes.
pub async fn run(
    pipeline: ChampSelectPipeline,
    controller: SessionController,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
) -> anyhow::Result<()> {
    info!("Champion select loop started");

    let (poll_tx, mut poll_rx) = mpsc::channel::<PollResult>(16);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<RecommendationOutcome>(4);

    let mut state = LoopState {
        controller,
        recommender: pipeline.recommender,
        sink: pipeline.sink,
        ui_tx,
        outcome_tx,
        recommendation_task: None,
        last_poll_error: None,
    };
    let source = pipeline.source;
    let mut sequencer = PollSequencer::new();

    let mut poll_interval = tokio::time::interval(pipeline.poll_interval);
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // --- Poll timer ---
            _ = poll_interval.tick() => {
                let id = sequencer.begin();
                let source = Arc::clone(&source);
                let tx = poll_tx.clone();
                tokio::spawn(async move {
                    let result = source.fetch_champ_select().await;
                    let _ = tx.send((id, result)).await;
                });
            }

            // --- Poll results ---
            Some((id, result)) = poll_rx.recv() => {
                if !sequencer.accept(id) {
                    debug!(id, "Discarding out-of-order poll result");
                    continue;
                }
                match result {
                    Ok(snapshot) => {
                        state.last_poll_error = None;
                        state.apply_snapshot(snapshot).await;
                    }
                    Err(e) => state.handle_poll_error(e).await,
                }
            }

            // --- Recommendation outcomes ---
            Some(outcome) = outcome_rx.recv() => {
                state.handle_outcome(outcome).await;
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::RequestRecommendation) => {
                        info!("Manual recommendation requested");
                        let decision = state.controller.on_manual_request();
                        state.handle_decision(decision, true).await;
                    }
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    if let Some(task) = state.recommendation_task.take() {
        task.abort();
    }
    info!("Champion select loop exiting");
    Ok(())
}
