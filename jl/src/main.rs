//! JudgeLoop - automated judge submission runner
//!
//! CLI entry point: resolve configuration and credentials, open the
//! progress store, then hand control to the submit engine and print the
//! final summary.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use judgeloop::cli::Cli;
use judgeloop::config::Config;
use judgeloop::engine::{EngineConfig, SubmitEngine};
use judgeloop::judge::{JudgeClient, LeetCodeClient};
use judgeloop::summary::render_summary;
use progresstore::ProgressStore;

fn setup_logging(level_str: Option<&str>) -> Result<()> {
    // Logs go to a file so the console stays free for the summary
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("judgeloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{s}', defaulting to INFO");
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("judgeloop.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.apply_cli(&cli);

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    // Credential pre-flight: refuse to start before any network I/O.
    let resolved = config.resolve()?;
    info!(
        max_questions = resolved.max_questions,
        target = resolved.target_success,
        "judgeloop starting"
    );

    let client: Arc<dyn JudgeClient> = Arc::new(
        LeetCodeClient::new(&resolved.session, &resolved.csrf)
            .context("Failed to build judge client")?
            .with_solutions_base(resolved.solutions_base.as_str())
            .with_lang(resolved.lang.as_str()),
    );

    let store = ProgressStore::open(&resolved.store_path).context("Failed to open progress store")?;

    // Ctrl-C stops the run at the next loop boundary instead of waiting
    // out a full pacing delay.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current attempt");
            let _ = cancel_tx.send(true);
        }
    });

    let mut engine = SubmitEngine::new(EngineConfig::from(&resolved), client, store).with_cancel(cancel_rx);
    let report = engine.run().await?;
    debug!(?report, "engine finished");

    println!("{}", render_summary(&report));
    Ok(())
}
