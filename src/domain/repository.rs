use crate::error::{ChangelogError, Result};
use std::fmt;

/// An `owner/repo` pair identifying a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepositoryRef {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse a repository reference
    ///
    /// Accepts `owner/repo`, `https://github.com/owner/repo(.git)` and
    /// `git@github.com:owner/repo(.git)`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');
        let path = if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
            rest
        } else if let Some(rest) = trimmed
            .strip_prefix("https://github.com/")
            .or_else(|| trimmed.strip_prefix("https://www.github.com/"))
            .or_else(|| trimmed.strip_prefix("http://github.com/"))
        {
            rest
        } else {
            trimmed
        };
        let path = path.strip_suffix(".git").unwrap_or(path);

        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if valid_segment(owner) && valid_segment(repo) => {
                Ok(RepositoryRef::new(owner, repo))
            }
            _ => Err(ChangelogError::unparsable_repository(format!(
                "'{}' is not of the form owner/repo",
                input
            ))),
        }
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
