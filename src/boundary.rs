use crate::domain::commit::short_sha;
use std::fmt;

/// Non-fatal conditions met while walking tags and history.
/// These are logged and surfaced to the user, never returned as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// History ran out before the starting commit was seen
    TargetShaNotFound { sha: String, commits_scanned: usize },
    /// Tag name is not a semantic version once the prefix is stripped
    UnparsableTag { tag: String },
    /// A later tag resolved to the same version and replaced this one
    DuplicateVersion { tag: String, replaced_by: String },
    /// Nothing was committed since the starting point
    NoNewCommits { since: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::TargetShaNotFound {
                sha,
                commits_scanned,
            } => write!(
                f,
                "Commit {} not found in history ({} commits scanned)",
                short_sha(sha),
                commits_scanned
            ),
            BoundaryWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': not a semantic version", tag)
            }
            BoundaryWarning::DuplicateVersion { tag, replaced_by } => write!(
                f,
                "Tag '{}' replaced by '{}' for the same version",
                tag, replaced_by
            ),
            BoundaryWarning::NoNewCommits { since } => {
                write!(f, "No new commits since {}", short_sha(since))
            }
        }
    }
}
