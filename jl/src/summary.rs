//! Final run summary rendering

use colored::*;

use crate::domain::{RunReport, TerminalReason};

/// Render the final counts for the console
///
/// Pure formatting; partial success is communicated here, not through the
/// exit code.
pub fn render_summary(report: &RunReport) -> String {
    let headline = match report.reason {
        TerminalReason::TargetReached => format!("{} Target reached", "✓".green()),
        TerminalReason::BlockedLimit => format!("{} Stopped: too many blocked attempts", "⚠".yellow()),
        TerminalReason::AttemptLimit => format!("{} Stopped: attempt limit reached", "⚠".yellow()),
        TerminalReason::Cancelled => format!("{} Stopped: cancelled", "⚠".yellow()),
    };

    let mut out = String::new();
    out.push_str(&headline);
    out.push('\n');
    out.push_str(&format!("  Accepted: {}\n", report.success_count.to_string().green()));
    out.push_str(&format!("  Attempts: {}\n", report.attempt_count));
    out.push_str(&format!("  Blocked:  {}", report.blocked_count));
    out
}
