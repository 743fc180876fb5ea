//! CLI argument parsing for judgeloop

use clap::Parser;
use std::path::PathBuf;

use crate::domain::ProblemId;

/// Automated judge submission runner
#[derive(Parser, Debug)]
#[command(name = "jl")]
#[command(author, version, about = "Automated judge submission loop", long_about = None)]
pub struct Cli {
    /// Judge session token (required, here or in the config file)
    #[arg(long, value_name = "TOKEN")]
    pub session: Option<String>,

    /// Judge CSRF token (required, here or in the config file)
    #[arg(long, value_name = "TOKEN")]
    pub csrf: Option<String>,

    /// Upper bound of the problem-identifier range
    #[arg(long, value_name = "N")]
    pub max_questions: Option<ProblemId>,

    /// Number of accepted submissions to stop at
    #[arg(short, long, value_name = "N")]
    pub target: Option<u32>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}
