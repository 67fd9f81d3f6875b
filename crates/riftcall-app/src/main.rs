// riftcall entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config; a missing API key stops here
// 3. Connect to the League client and identify the summoner
// 4. Create mpsc channels
// 5. Spawn the champion-select loop, the ready-check loop and the console
// 6. Run the key listener until the user quits
// 7. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use riftcall_app::app::{self, ChampSelectPipeline};
use riftcall_app::archive::MarkdownArchive;
use riftcall_app::console;
use riftcall_app::input;
use riftcall_app::lcu::LcuClient;
use riftcall_app::protocol::UiUpdate;
use riftcall_app::ready_check;
use riftcall_core::champions::ChampionDirectory;
use riftcall_core::config;
use riftcall_core::controller::SessionController;
use riftcall_core::ready_check::ReadyCheckAutomator;
use riftcall_llm::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("riftcall starting up");

    // 2. Load config and build the recommendation client
    let config = config::load_config().context("failed to load configuration")?;
    let directory = Arc::new(ChampionDirectory::builtin());
    let recommender = OpenAiClient::from_config(&config, Arc::clone(&directory))
        .context("OpenAI API key not configured")?;
    info!(
        "Config loaded: model={}, poll every {}ms, auto-accept {}",
        recommender.model(),
        config.lcu.poll_interval_ms,
        if config.ready_check.enabled { "on" } else { "off" }
    );

    // 3. Connect to the League client
    let lcu = Arc::new(
        LcuClient::connect(&config.lcu)
            .context("failed to connect to the League client; make sure it is running and logged in")?,
    );
    let summoner = lcu
        .current_summoner()
        .await
        .context("failed to get summoner info")?;
    info!("Logged in as {} (id {})", summoner.label(), summoner.summoner_id);

    // 4. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 5. Spawn the console, then the pipelines
    let console_handle = tokio::spawn(async move {
        if let Err(e) = console::run(ui_rx, std::io::stdout()).await {
            error!("Console error: {}", e);
        }
    });
    let _ = ui_tx
        .send(UiUpdate::Connected {
            summoner: summoner.label(),
        })
        .await;

    let ready_check_handle = if config.ready_check.enabled {
        let automator = ReadyCheckAutomator::new(config.ready_check.accept_delay());
        let source = Arc::clone(&lcu);
        let acceptor = Arc::clone(&lcu);
        let poll = config.ready_check.poll_interval();
        let tx = ui_tx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = ready_check::run(automator, source, acceptor, poll, tx).await {
                error!("Ready-check loop error: {}", e);
            }
        }))
    } else {
        None
    };

    let pipeline = ChampSelectPipeline {
        source: lcu,
        recommender: Arc::new(recommender),
        sink: Arc::new(MarkdownArchive::new(config.archive.sessions_dir.clone())),
        poll_interval: config.lcu.poll_interval(),
    };
    let controller = SessionController::new(summoner.summoner_id, directory);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(pipeline, controller, cmd_rx, ui_tx).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Key listener (blocks until the user quits)
    info!("Application ready, waiting for champion select");
    if let Err(e) = input::run(cmd_tx).await {
        error!("Key listener error: {}", e);
    }

    // 7. Cleanup: wait for the app loop to finish (with timeout)
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;
    if let Some(handle) = ready_check_handle {
        handle.abort();
    }
    console_handle.abort();

    info!("riftcall shut down cleanly");
    println!("Shutting down...");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the console).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("riftcall.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("riftcall=info,riftcall_app=info,riftcall_core=info,riftcall_llm=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
