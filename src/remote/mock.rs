use crate::domain::Commit;
use crate::remote::{
    CommitPage, CommitPageRequest, HistoryTransport, TagPage, TagRef, TransportError,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const CURSOR_PREFIX: &str = "page-";

/// Scripted transport for testing without network access
///
/// Pages are served in order; the cursor handed back for page `n` is
/// `page-n`. Failures queued for a page index are returned, one per call,
/// before that page is served.
pub struct MockTransport {
    default_branch: String,
    commit_pages: Vec<Vec<Commit>>,
    tag_pages: Vec<Vec<TagRef>>,
    commit_failures: Mutex<HashMap<usize, VecDeque<TransportError>>>,
    tag_failures: Mutex<HashMap<usize, VecDeque<TransportError>>>,
    commit_requests: Mutex<Vec<CommitPageRequest>>,
    commit_page_calls: AtomicUsize,
    tag_page_calls: AtomicUsize,
    default_branch_calls: AtomicUsize,
}

impl MockTransport {
    /// Create an empty mock whose default branch is `main`
    pub fn new() -> Self {
        MockTransport {
            default_branch: "main".to_string(),
            commit_pages: Vec::new(),
            tag_pages: Vec::new(),
            commit_failures: Mutex::new(HashMap::new()),
            tag_failures: Mutex::new(HashMap::new()),
            commit_requests: Mutex::new(Vec::new()),
            commit_page_calls: AtomicUsize::new(0),
            tag_page_calls: AtomicUsize::new(0),
            default_branch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Commit history, newest first, already split into pages
    pub fn with_commit_pages(mut self, pages: Vec<Vec<Commit>>) -> Self {
        self.commit_pages = pages;
        self
    }

    pub fn with_tag_pages(mut self, pages: Vec<Vec<TagRef>>) -> Self {
        self.tag_pages = pages;
        self
    }

    /// Queue a failure for the request of page `index`
    pub fn fail_commit_page(self, index: usize, error: TransportError) -> Self {
        push_failure(&self.commit_failures, index, error);
        self
    }

    pub fn fail_tag_page(self, index: usize, error: TransportError) -> Self {
        push_failure(&self.tag_failures, index, error);
        self
    }

    pub fn commit_page_calls(&self) -> usize {
        self.commit_page_calls.load(Ordering::SeqCst)
    }

    pub fn tag_page_calls(&self) -> usize {
        self.tag_page_calls.load(Ordering::SeqCst)
    }

    pub fn default_branch_calls(&self) -> usize {
        self.default_branch_calls.load(Ordering::SeqCst)
    }

    /// Every commit page request received, failed attempts included
    pub fn commit_requests(&self) -> Vec<CommitPageRequest> {
        self.commit_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn push_failure(
    failures: &Mutex<HashMap<usize, VecDeque<TransportError>>>,
    index: usize,
    error: TransportError,
) {
    if let Ok(mut failures) = failures.lock() {
        failures.entry(index).or_default().push_back(error);
    }
}

fn pop_failure(
    failures: &Mutex<HashMap<usize, VecDeque<TransportError>>>,
    index: usize,
) -> Option<TransportError> {
    failures
        .lock()
        .ok()
        .and_then(|mut failures| failures.get_mut(&index).and_then(VecDeque::pop_front))
}

fn page_index(cursor: Option<&str>) -> Result<usize, TransportError> {
    match cursor {
        None => Ok(0),
        Some(cursor) => cursor
            .strip_prefix(CURSOR_PREFIX)
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| TransportError::new(Some(400), format!("bad cursor '{}'", cursor))),
    }
}

fn next_cursor(index: usize, total: usize) -> (Option<String>, bool) {
    if index + 1 < total {
        (Some(format!("{}{}", CURSOR_PREFIX, index + 1)), true)
    } else {
        (None, false)
    }
}

#[async_trait]
impl HistoryTransport for MockTransport {
    async fn fetch_commit_page(
        &self,
        request: &CommitPageRequest,
    ) -> Result<CommitPage, TransportError> {
        self.commit_page_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.commit_requests.lock() {
            requests.push(request.clone());
        }

        let index = page_index(request.cursor.as_deref())?;
        if let Some(error) = pop_failure(&self.commit_failures, index) {
            return Err(error);
        }

        let commits = self.commit_pages.get(index).cloned().unwrap_or_default();
        let (end_cursor, has_next_page) = next_cursor(index, self.commit_pages.len());
        Ok(CommitPage {
            commits,
            end_cursor,
            has_next_page,
        })
    }

    async fn fetch_tag_page(&self, cursor: Option<&str>) -> Result<TagPage, TransportError> {
        self.tag_page_calls.fetch_add(1, Ordering::SeqCst);

        let index = page_index(cursor)?;
        if let Some(error) = pop_failure(&self.tag_failures, index) {
            return Err(error);
        }

        let tags = self.tag_pages.get(index).cloned().unwrap_or_default();
        let (end_cursor, has_next_page) = next_cursor(index, self.tag_pages.len());
        Ok(TagPage {
            tags,
            end_cursor,
            has_next_page,
        })
    }

    async fn resolve_default_branch(&self) -> Result<String, TransportError> {
        self.default_branch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.default_branch.clone())
    }
}
