//! Pure formatting functions for UI output.
//!
//! Everything here writes to stderr: stdout carries the generated markdown
//! and must stay clean for redirection.

use crate::analyzer::ReleaseCandidate;
use crate::boundary::BoundaryWarning;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Summary of the resolved release, one fact per line.
///
/// Shows either:
/// - If a release exists: "From: old_tag -> To: new_version"
/// - If first release: "Initial Release: new_version"
pub fn format_candidate_summary(candidate: &ReleaseCandidate, commit_count: usize) -> String {
    let mut lines = Vec::new();
    match &candidate.previous_tag {
        Some(previous) => {
            lines.push(style("Proposed Release:").bold().to_string());
            lines.push(format!("  From: {}", style(previous).red()));
            lines.push(format!("  To:   {}", style(&candidate.version).green()));
        }
        None => {
            lines.push(style("Initial Release:").bold().to_string());
            lines.push(format!("  Version: {}", style(&candidate.version).green()));
        }
    }
    lines.push(format!("  Decided by: {}", candidate.path));
    lines.push(format!(
        "  Commits: {}",
        match commit_count {
            1 => "1 commit".to_string(),
            n => format!("{} commits", n),
        }
    ));
    lines.join("\n")
}

/// Print the release summary to stderr.
pub fn display_candidate_summary(candidate: &ReleaseCandidate, commit_count: usize) {
    eprintln!("\n{}", format_candidate_summary(candidate, commit_count));
}
