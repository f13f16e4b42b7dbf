//! Remote history access
//!
//! The [HistoryTransport] trait is the seam between the release engine and
//! whatever hosts the repository. Implementations include:
//!
//! - [github::GitHubTransport]: GitHub GraphQL/REST over `reqwest`
//! - [mock::MockTransport]: scripted pages and failures for testing
//!
//! [history::HistoryClient] sits on top of a transport and owns pagination,
//! retry and cancellation.

pub mod github;
pub mod history;
pub mod mock;

pub use github::{ClientMode, GitHubTransport};
pub use history::HistoryClient;
pub use mock::MockTransport;

use crate::domain::Commit;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Status code the engine treats as transient
pub const RETRYABLE_STATUS: u16 = 502;

/// Failure reported by a transport, with the HTTP status when there is one
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}{}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        TransportError {
            status,
            message: message.into(),
        }
    }

    /// Only upstream 502s are retried
    pub fn is_retryable(&self) -> bool {
        self.status == Some(RETRYABLE_STATUS)
    }
}

/// Parameters for one page of commit history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPageRequest {
    pub branch: String,
    pub cursor: Option<String>,
    pub page_size: usize,
    /// Only commits touching this path prefix; filtered by the host
    pub path: Option<String>,
}

/// One page of commits, newest first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitPage {
    pub commits: Vec<Commit>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Tag name and the sha of the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub sha: String,
}

impl TagRef {
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        TagRef {
            name: name.into(),
            sha: sha.into(),
        }
    }
}

/// One page of tags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagPage {
    pub tags: Vec<TagRef>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Paginated access to a hosted repository's history
///
/// All implementors must be `Send + Sync` so one transport can serve many
/// concurrent invocations.
///
/// Implementations report failures as [TransportError] carrying the HTTP
/// status when one is known; the retry policy lives in
/// [history::HistoryClient], not here.
#[async_trait]
pub trait HistoryTransport: Send + Sync {
    /// Fetch one page of commits reachable from `request.branch`
    async fn fetch_commit_page(
        &self,
        request: &CommitPageRequest,
    ) -> Result<CommitPage, TransportError>;

    /// Fetch one page of tags, starting after `cursor`
    async fn fetch_tag_page(&self, cursor: Option<&str>) -> Result<TagPage, TransportError>;

    /// Name of the repository's default branch
    async fn resolve_default_branch(&self) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: HistoryTransport + ?Sized> HistoryTransport for Arc<T> {
    async fn fetch_commit_page(
        &self,
        request: &CommitPageRequest,
    ) -> Result<CommitPage, TransportError> {
        (**self).fetch_commit_page(request).await
    }

    async fn fetch_tag_page(&self, cursor: Option<&str>) -> Result<TagPage, TransportError> {
        (**self).fetch_tag_page(cursor).await
    }

    async fn resolve_default_branch(&self) -> Result<String, TransportError> {
        (**self).resolve_default_branch().await
    }
}
