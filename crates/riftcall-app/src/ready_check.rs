// Ready-check pipeline.
//
// Polls the matchmaking ready check independently of champion select and
// drives a `ReadyCheckAutomator`: each poll is observed, and when a countdown
// is pending the loop also sleeps until its deadline to issue the accept.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use riftcall_core::ports::{ReadyCheckAcceptor, SnapshotSource};
use riftcall_core::ready_check::{ReadyCheckAutomator, ReadyCheckEvent};

use crate::protocol::{ReadyCheckUpdate, UiUpdate};

/// Run until the UI channel closes. Aborting the task cancels any pending
/// countdown without issuing the accept.
pub async fn run(
    mut automator: ReadyCheckAutomator,
    source: Arc<dyn SnapshotSource>,
    acceptor: Arc<dyn ReadyCheckAcceptor>,
    poll_interval: Duration,
    ui_tx: mpsc::Sender<UiUpdate>,
) -> anyhow::Result<()> {
    info!(
        "Ready-check pipeline started (accept delay {}s)",
        automator.delay().as_secs()
    );

    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let deadline = automator.deadline();

        let update = tokio::select! {
            _ = interval.tick() => {
                match source.fetch_ready_check().await {
                    Ok(check) => match automator.observe(check.as_ref(), Instant::now()) {
                        ReadyCheckEvent::Unchanged | ReadyCheckEvent::Cancelled => None,
                        ReadyCheckEvent::CountdownStarted { .. } => {
                            Some(ReadyCheckUpdate::CountdownStarted {
                                delay_secs: automator.delay().as_secs(),
                            })
                        }
                        ReadyCheckEvent::AlreadyAccepted => Some(ReadyCheckUpdate::AlreadyAccepted),
                    },
                    Err(e) => {
                        debug!("Ready-check poll failed: {:#}", e);
                        None
                    }
                }
            }
            _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                automator
                    .fire(acceptor.as_ref(), Instant::now())
                    .await
                    .map(ReadyCheckUpdate::Finished)
            }
        };

        if let Some(update) = update {
            if ui_tx.send(UiUpdate::ReadyCheck(update)).await.is_err() {
                info!("UI channel closed, ready-check pipeline exiting");
                break;
            }
        }
    }
    Ok(())
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use riftcall_core::snapshot::{RawSession, ReadyCheckState};
    use riftcall_core::ready_check::AcceptOutcome;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a script of ready-check states, one per poll, repeating the
    /// last. Accepting flips the current state to accepted.
    struct FakeClient {
        script: Mutex<VecDeque<Option<ReadyCheckState>>>,
        current: Mutex<Option<ReadyCheckState>>,
        accepts: AtomicUsize,
    }

    impl FakeClient {
        fn new(script: Vec<Option<ReadyCheckState>>) -> Arc<Self> {
            Arc::new(FakeClient {
                script: Mutex::new(script.into()),
                current: Mutex::new(None),
                accepts: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SnapshotSource for FakeClient {
        async fn fetch_champ_select(&self) -> anyhow::Result<Option<RawSession>> {
            Ok(None)
        }

        async fn fetch_ready_check(&self) -> anyhow::Result<Option<ReadyCheckState>> {
            let mut current = self.current.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *current = next;
            }
            Ok(current.clone())
        }
    }

    #[async_trait]
    impl ReadyCheckAcceptor for FakeClient {
        async fn accept_ready_check(&self) -> anyhow::Result<bool> {
            self.accepts.fetch_add(1, Ordering::SeqCst);
            self.script.lock().unwrap().clear();
            *self.current.lock().unwrap() = Some(check("InProgress", "Accepted"));
            Ok(true)
        }
    }

    fn check(state: &str, response: &str) -> ReadyCheckState {
        ReadyCheckState {
            state: Some(state.to_string()),
            player_response: Some(response.to_string()),
        }
    }

    fn pending() -> Option<ReadyCheckState> {
        Some(check("InProgress", "None"))
    }

    fn spawn(client: &Arc<FakeClient>) -> (tokio::task::JoinHandle<anyhow::Result<()>>, mpsc::Receiver<UiUpdate>) {
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let handle = tokio::spawn(run(
            ReadyCheckAutomator::new(Duration::from_secs(5)),
            client.clone(),
            client.clone(),
            Duration::from_secs(1),
            ui_tx,
        ));
        (handle, ui_rx)
    }

    fn drain(rx: &mut mpsc::Receiver<UiUpdate>) -> Vec<ReadyCheckUpdate> {
        let mut out = Vec::new();
        while let Ok(UiUpdate::ReadyCheck(update)) = rx.try_recv() {
            out.push(update);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn accepts_once_after_delay() {
        let client = FakeClient::new(vec![pending()]);
        let (handle, mut ui_rx) = spawn(&client);

        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 1);
        assert_eq!(
            drain(&mut ui_rx),
            vec![
                ReadyCheckUpdate::CountdownStarted { delay_secs: 5 },
                ReadyCheckUpdate::Finished(AcceptOutcome::Accepted),
            ]
        );
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn player_accepting_first_cancels_countdown() {
        let client = FakeClient::new(vec![
            pending(),
            pending(),
            pending(),
            Some(check("InProgress", "Accepted")),
        ]);
        let (handle, mut ui_rx) = spawn(&client);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 0);
        assert_eq!(
            drain(&mut ui_rx),
            vec![
                ReadyCheckUpdate::CountdownStarted { delay_secs: 5 },
                ReadyCheckUpdate::AlreadyAccepted,
            ]
        );
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_check_cancels_silently() {
        let client = FakeClient::new(vec![pending(), pending(), None]);
        let (handle, mut ui_rx) = spawn(&client);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 0);
        assert_eq!(
            drain(&mut ui_rx),
            vec![ReadyCheckUpdate::CountdownStarted { delay_secs: 5 }]
        );
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn check_leaving_in_progress_cancels_silently() {
        let client = FakeClient::new(vec![pending(), Some(check("Invalid", "None"))]);
        let (handle, mut ui_rx) = spawn(&client);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 0);
        assert_eq!(
            drain(&mut ui_rx),
            vec![ReadyCheckUpdate::CountdownStarted { delay_secs: 5 }]
        );
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn new_check_after_silent_cancel_is_accepted() {
        let client = FakeClient::new(vec![pending(), None, pending()]);
        let (handle, mut ui_rx) = spawn(&client);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 1);
        assert_eq!(
            drain(&mut ui_rx),
            vec![
                ReadyCheckUpdate::CountdownStarted { delay_secs: 5 },
                ReadyCheckUpdate::CountdownStarted { delay_secs: 5 },
                ReadyCheckUpdate::Finished(AcceptOutcome::Accepted),
            ]
        );
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn abort_while_pending_never_accepts() {
        let client = FakeClient::new(vec![pending()]);
        let (handle, _ui_rx) = spawn(&client);

        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.abort();
        let _ = handle.await;

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(client.accepts.load(Ordering::SeqCst), 0);
    }
}
