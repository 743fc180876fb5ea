use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;

use progresstore::ProgressStore;
use progresstore::cli::{Cli, Command};
use progresstore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let store_path = cli.store.clone().unwrap_or(config.store_path);

    info!("progresstore starting");

    let store = ProgressStore::open(&store_path)?;

    match cli.command {
        Command::Stats => {
            let record = store.load()?;
            let skipped = store.read_skipped()?;
            let solved = record.solved_ids().len();
            println!("Store: {}", store_path.display().to_string().cyan());
            println!("  Terminal problems: {}", record.len());
            println!("  Accepted:          {}", solved.to_string().green());
            println!("  Failed:            {}", record.len() - solved);
            println!("  Skipped-log lines: {}", skipped.len());
        }
        Command::Solved => {
            let record = store.load()?;
            let mut ids: Vec<_> = record.solved_ids().into_iter().collect();
            ids.sort_unstable();
            if ids.is_empty() {
                println!("No accepted problems recorded");
            } else {
                for id in ids {
                    println!("{id}");
                }
            }
        }
        Command::Skipped => {
            let entries = store.read_skipped()?;
            if entries.is_empty() {
                println!("Skipped log is empty");
            } else {
                for entry in entries {
                    println!(
                        "{} {} {}",
                        entry.noted_at.to_rfc3339().dimmed(),
                        entry.problem_id.to_string().yellow(),
                        entry.outcome
                    );
                }
            }
        }
        Command::Reset { id, all } => {
            if all {
                store.reset_all()?;
                println!("{} Reset store: {}", "✓".green(), store_path.display());
            } else if let Some(id) = id {
                let mut record = store.load()?;
                if record.remove(id) {
                    store.save(&record)?;
                    println!("{} Problem {} is eligible again", "✓".green(), id);
                } else {
                    println!("Problem {id} was not marked terminal");
                }
            } else {
                bail!("reset needs a problem id or --all");
            }
        }
    }

    Ok(())
}
