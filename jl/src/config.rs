//! Configuration types and loading

use std::path::{Path, PathBuf};

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::domain::ProblemId;

/// Application configuration, file-loadable with per-field defaults
///
/// CLI flags override file values; credentials stay optional here and are
/// enforced by [`Config::resolve`] before any network I/O happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Judge session token
    #[serde(default)]
    pub session: Option<String>,

    /// Judge anti-forgery (CSRF) token
    #[serde(default)]
    pub csrf: Option<String>,

    /// Upper bound of the problem-identifier range
    #[serde(default = "default_max_questions")]
    pub max_questions: ProblemId,

    /// Accepted submissions to stop at
    #[serde(default = "default_target_success")]
    pub target_success: u32,

    /// Random draws before the selector scans the complement
    #[serde(default = "default_draw_budget")]
    pub draw_budget: u32,

    /// Pause between attempts, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_between_attempts_ms: u64,

    /// Overall attempt ceiling
    #[serde(default = "default_attempt_limit")]
    pub attempt_limit: u32,

    /// Blocked responses to stop at
    #[serde(default = "default_blocked_limit")]
    pub blocked_limit: u32,

    /// Progress store directory
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Companion solutions site base URL
    #[serde(default = "default_solutions_base")]
    pub solutions_base: String,

    /// Submission language
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_max_questions() -> ProblemId {
    3691
}

fn default_target_success() -> u32 {
    1
}

fn default_draw_budget() -> u32 {
    4
}

fn default_delay_ms() -> u64 {
    1500
}

fn default_attempt_limit() -> u32 {
    2000
}

fn default_blocked_limit() -> u32 {
    4
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("judgeloop")
}

fn default_solutions_base() -> String {
    "https://walkccc.me/LeetCode/problems".to_string()
}

fn default_lang() -> String {
    "cpp".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: None,
            csrf: None,
            max_questions: default_max_questions(),
            target_success: default_target_success(),
            draw_budget: default_draw_budget(),
            delay_between_attempts_ms: default_delay_ms(),
            attempt_limit: default_attempt_limit(),
            blocked_limit: default_blocked_limit(),
            store_path: default_store_path(),
            solutions_base: default_solutions_base(),
            lang: default_lang(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("judgeloop").join("config.yml")),
            Some(PathBuf::from("judgeloop.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay CLI flags onto file/default values
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.session.is_some() {
            self.session = cli.session.clone();
        }
        if cli.csrf.is_some() {
            self.csrf = cli.csrf.clone();
        }
        if let Some(max_questions) = cli.max_questions {
            self.max_questions = max_questions;
        }
        if let Some(target) = cli.target {
            self.target_success = target;
        }
        if cli.log_level.is_some() {
            self.log_level = cli.log_level.clone();
        }
    }

    /// Enforce required credentials, yielding a fully concrete config
    ///
    /// Fails before any network I/O when session or CSRF token is absent.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let (Some(session), Some(csrf)) = (self.session.clone(), self.csrf.clone()) else {
            eyre::bail!("both a session token and a csrf token are required (--session/--csrf or config file)");
        };

        Ok(ResolvedConfig {
            session,
            csrf,
            max_questions: self.max_questions,
            target_success: self.target_success,
            draw_budget: self.draw_budget,
            delay_between_attempts_ms: self.delay_between_attempts_ms,
            attempt_limit: self.attempt_limit,
            blocked_limit: self.blocked_limit,
            store_path: self.store_path.clone(),
            solutions_base: self.solutions_base.clone(),
            lang: self.lang.clone(),
        })
    }
}

/// Configuration after credential resolution - every field concrete
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub session: String,
    pub csrf: String,
    pub max_questions: ProblemId,
    pub target_success: u32,
    pub draw_budget: u32,
    pub delay_between_attempts_ms: u64,
    pub attempt_limit: u32,
    pub blocked_limit: u32,
    pub store_path: PathBuf,
    pub solutions_base: String,
    pub lang: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_judge_catalog() {
        let config = Config::default();
        assert_eq!(config.max_questions, 3691);
        assert_eq!(config.target_success, 1);
        assert_eq!(config.draw_budget, 4);
        assert_eq!(config.delay_between_attempts_ms, 1500);
        assert_eq!(config.attempt_limit, 2000);
        assert_eq!(config.blocked_limit, 4);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "target_success: 5\nsession: abc\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.target_success, 5);
        assert_eq!(config.session.as_deref(), Some("abc"));
        assert_eq!(config.max_questions, 3691);
    }

    #[test]
    fn test_resolve_requires_both_credentials() {
        let mut config = Config::default();
        assert!(config.resolve().is_err());

        config.session = Some("session".to_string());
        assert!(config.resolve().is_err());

        config.csrf = Some("csrf".to_string());
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.session, "session");
        assert_eq!(resolved.csrf, "csrf");
    }
}
