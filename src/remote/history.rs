use crate::boundary::BoundaryWarning;
use crate::domain::Commit;
use crate::error::{ChangelogError, Result};
use crate::remote::{CommitPageRequest, HistoryTransport, TagRef, TransportError};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Attempts made for a single page request before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Walks remote commit and tag history page by page
///
/// Each page request is retried on upstream 502s, up to [MAX_ATTEMPTS]
/// attempts. Other failures propagate immediately. The pagination cursor and
/// the accumulated results live only for the duration of one call.
pub struct HistoryClient<T> {
    transport: T,
    branch: Option<String>,
    retry_delay: Duration,
    cancellation: Option<CancellationToken>,
    warnings: Mutex<Vec<BoundaryWarning>>,
}

impl<T: HistoryTransport> HistoryClient<T> {
    /// Create a client traversing the default branch with immediate retries
    pub fn new(transport: T) -> Self {
        HistoryClient {
            transport,
            branch: None,
            retry_delay: Duration::ZERO,
            cancellation: None,
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Traverse `branch` instead of the repository's default branch
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.is_empty());
        self
    }

    /// Wait this long between retry attempts
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Abort in-flight requests when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Warnings recorded since the last call, oldest first
    pub fn take_warnings(&self) -> Vec<BoundaryWarning> {
        self.warnings
            .lock()
            .map(|mut warnings| std::mem::take(&mut *warnings))
            .unwrap_or_default()
    }

    fn record(&self, warning: BoundaryWarning) {
        debug!(%warning, "recorded warning");
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(warning);
        }
    }

    /// Commits newer than `target_sha`, newest first
    ///
    /// Stops as soon as a commit with sha `target_sha` is seen (it is not
    /// included). When history runs out before that, every commit seen is
    /// returned and a [BoundaryWarning::TargetShaNotFound] is recorded.
    pub async fn fetch_commits_since(
        &self,
        target_sha: &str,
        page_size: usize,
        path: Option<&str>,
    ) -> Result<Vec<Commit>> {
        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => {
                self.with_retry("resolve_default_branch", || {
                    self.transport.resolve_default_branch()
                })
                .await?
            }
        };

        let mut request = CommitPageRequest {
            branch,
            cursor: None,
            page_size,
            path: path.map(str::to_string),
        };
        let mut commits = Vec::new();

        loop {
            let page = self
                .with_retry("fetch_commit_page", || {
                    self.transport.fetch_commit_page(&request)
                })
                .await?;
            debug!(
                branch = %request.branch,
                cursor = ?request.cursor,
                received = page.commits.len(),
                has_next_page = page.has_next_page,
                "fetched commit page"
            );

            for commit in page.commits {
                if commit.sha == target_sha {
                    return Ok(commits);
                }
                commits.push(commit);
            }

            match page.end_cursor {
                Some(cursor) if page.has_next_page => request.cursor = Some(cursor),
                _ => {
                    self.record(BoundaryWarning::TargetShaNotFound {
                        sha: target_sha.to_string(),
                        commits_scanned: commits.len(),
                    });
                    return Ok(commits);
                }
            }
        }
    }

    /// Every tag in the repository, in the order the host lists them
    pub async fn all_tags(&self) -> Result<Vec<TagRef>> {
        let mut cursor: Option<String> = None;
        let mut tags = Vec::new();

        loop {
            let page = self
                .with_retry("fetch_tag_page", || {
                    self.transport.fetch_tag_page(cursor.as_deref())
                })
                .await?;
            debug!(
                received = page.tags.len(),
                has_next_page = page.has_next_page,
                "fetched tag page"
            );
            tags.extend(page.tags);

            match page.end_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => return Ok(tags),
            }
        }
    }

    async fn with_retry<R, F, Fut>(&self, operation: &str, mut call: F) -> Result<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, TransportError>>,
    {
        let mut attempt = 1;
        loop {
            match self.cancellable(call()).await? {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(operation, attempt, error = %err, "transient failure, retrying");
                    if !self.retry_delay.is_zero() {
                        self.cancellable(tokio::time::sleep(self.retry_delay)).await?;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    debug!(operation, attempt, error = %err, "request failed");
                    return Err(err.into());
                }
            }
        }
    }

    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output> {
        match &self.cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ChangelogError::Cancelled),
                output = future => Ok(output),
            },
            None => Ok(future.await),
        }
    }
}
