//! CLI argument parsing for progresstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "progresstore")]
#[command(author, version, about = "Inspect and reset judge submission progress", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store directory (overrides config)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show store statistics
    Stats,

    /// List accepted problem ids
    Solved,

    /// Show the skipped-attempts audit trail
    Skipped,

    /// Remove a problem's terminal marking so it becomes eligible again
    Reset {
        /// Problem id to reset
        id: Option<u32>,

        /// Reset the whole store (record and skipped log)
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}
