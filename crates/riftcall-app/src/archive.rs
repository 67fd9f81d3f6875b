// Markdown session archive.
//
// One directory per champion-select session under the configured sessions
// root, one file per recommendation:
//
//   sessions/2025-01-31T20-15-04_s1/query-01-your-turn.md
//   sessions/2025-01-31T20-15-04_s1/query-02-manual-query.md

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::info;

use riftcall_core::controller::{RecommendationRecord, SessionHandle};
use riftcall_core::ports::RecommendationSink;

pub struct MarkdownArchive {
    root: PathBuf,
}

impl MarkdownArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MarkdownArchive { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_dir(&self, session: &SessionHandle) -> PathBuf {
        self.root.join(session.dir_name())
    }

    pub fn file_path(&self, record: &RecommendationRecord) -> PathBuf {
        self.session_dir(&record.session)
            .join(file_name(record.sequence, record.reason.slug()))
    }
}

#[async_trait]
impl RecommendationSink for MarkdownArchive {
    async fn record(&self, record: &RecommendationRecord) -> anyhow::Result<Option<PathBuf>> {
        let dir = self.session_dir(&record.session);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create session directory {}", dir.display()))?;

        let path = self.file_path(record);
        let content = render_markdown(record, Local::now());
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!("Recommendation saved to {}", path.display());
        Ok(Some(path))
    }

    fn session_location(&self, session: &SessionHandle) -> Option<PathBuf> {
        let dir = self.session_dir(session);
        dir.is_dir().then_some(dir)
    }
}

pub fn file_name(sequence: u32, slug: &str) -> String {
    format!("query-{sequence:02}-{slug}.md")
}

/// Render one recommendation as a standalone markdown document.
pub fn render_markdown(record: &RecommendationRecord, at: DateTime<Local>) -> String {
    let view = &record.view;
    let mut out = String::with_capacity(1024 + record.text.len());

    out.push_str("# Champion Select Recommendation\n\n");
    out.push_str(&format!("**Timestamp:** {}  \n", at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("**Query Type:** {}  \n", record.reason.label()));
    out.push_str(&format!("**Phase:** {}\n\n", view.phase));
    if let Some(role) = &view.local_role {
        out.push_str(&format!("**Your Role:** {role}\n\n"));
    }
    out.push_str("---\n\n");

    if !view.allies.is_empty() {
        out.push_str("## Allied Team\n\n");
        for champ in &view.allies {
            let marker = if champ.is_local_player { " (YOU)" } else { "" };
            let hover = if champ.is_locked { "" } else { " _(hovering)_" };
            out.push_str(&format!(
                "- **{}** - {}{}{}\n",
                champ.display_name, champ.position, marker, hover
            ));
        }
        out.push('\n');
    }

    if !view.enemies.is_empty() {
        out.push_str("## Enemy Team\n\n");
        for champ in &view.enemies {
            out.push_str(&format!("- **{}** - {}\n", champ.display_name, champ.position));
        }
        out.push('\n');
    }

    if !view.bans.is_empty() {
        out.push_str("## Banned Champions\n\n");
        let names: Vec<&str> = view.bans.iter().map(|b| b.display_name.as_str()).collect();
        out.push_str(&names.join(", "));
        out.push_str("\n\n");
    }

    out.push_str("---\n\n");
    out.push_str("## AI Recommendation\n\n");
    out.push_str(&record.text);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
