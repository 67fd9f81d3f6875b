// Collaborator interfaces the pipelines are driven through.
//
// Production implementations live in `riftcall-app` (League client, session
// archive) and `riftcall-llm` (recommendation client). Tests use in-memory
// fakes.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::controller::{RecommendationRecord, SessionHandle};
use crate::normalize::NormalizedView;
use crate::snapshot::{RawSession, ReadyCheckState};

/// Source of raw snapshots. `Ok(None)` means "nothing active right now".
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_champ_select(&self) -> anyhow::Result<Option<RawSession>>;
    async fn fetch_ready_check(&self) -> anyhow::Result<Option<ReadyCheckState>>;
}

/// Issues the ready-check accept. `Ok(true)` means the client took it.
#[async_trait]
pub trait ReadyCheckAcceptor: Send + Sync {
    async fn accept_ready_check(&self) -> anyhow::Result<bool>;
}

/// Why a recommendation call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecommendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned no content (finish reason: {finish_reason})")]
    EmptyResponse { finish_reason: String },

    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

/// Produces a pick recommendation for a champion-select view.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, view: &NormalizedView) -> Result<String, RecommendError>;
}

/// Receives every successful recommendation exactly once.
#[async_trait]
pub trait RecommendationSink: Send + Sync {
    /// Store one recommendation. Returns where it was written, if the sink
    /// has such a notion.
    async fn record(&self, record: &RecommendationRecord) -> anyhow::Result<Option<PathBuf>>;

    /// Where a session's recommendations live, once any have been stored.
    fn session_location(&self, _session: &SessionHandle) -> Option<PathBuf> {
        None
    }
}
