use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]*)\))?(!)?:\s*(.*)$").expect("valid header pattern")
});

static NOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s|*]*(BREAKING CHANGE|BREAKING-CHANGE)[:\s]+(.*)$").expect("valid note pattern")
});

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(close[sd]?|fix(?:e[sd])?|resolve[sd]?)\s+)?(?:([\w.-]+)/([\w.-]+))?#(\d+)\b",
    )
    .expect("valid reference pattern")
});

static REVERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(?:Revert|revert:)\s"?(.+?)"?\s*This reverts commit (\w+)\."#)
        .expect("valid revert pattern")
});

/// A commit as fetched from the remote history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    /// Paths touched by the commit, when the transport can supply them
    pub files: Vec<String>,
}

impl Commit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Commit {
            sha: sha.into(),
            message: message.into(),
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// First seven characters of the sha
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

/// Abbreviated form of a commit sha, as shown in links and messages
pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// Issue or pull request referenced from a commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Closing keyword preceding the reference (e.g. "closes")
    pub action: Option<String>,
    pub owner: Option<String>,
    pub repository: Option<String>,
    pub issue: u64,
}

/// Marker for a commit that reverts an earlier one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revert {
    pub header: String,
    pub sha: String,
}

/// Structured view of a commit message following the conventional commits grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub sha: String,
    pub raw_message: String,
    pub header: String,
    pub r#type: Option<String>,
    pub scope: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Breaking change notes, each normalized to a single line
    pub breaking_notes: Vec<String>,
    pub references: Vec<Reference>,
    pub revert: Option<Revert>,
}

impl ClassifiedCommit {
    /// Classify a commit message
    ///
    /// Supports formats:
    /// - type(scope)!: subject
    /// - type(scope): subject
    /// - type!: subject
    /// - type: subject
    /// - non-conventional text (type and scope stay unset)
    ///
    /// Footers starting with `BREAKING CHANGE:` or `BREAKING-CHANGE:` become
    /// breaking notes; a `!` header without such a footer uses the subject as
    /// the note.
    pub fn parse(commit: &Commit) -> Self {
        let message = commit.message.replace("\r\n", "\n");
        let message = message.trim();
        let mut lines = message.lines();
        let header = lines.next().unwrap_or_default().trim().to_string();
        let rest: Vec<&str> = lines.collect();

        let (r#type, scope, subject, bang) = match HEADER_RE.captures(&header) {
            Some(captures) => (
                captures.get(1).map(|m| m.as_str().to_string()),
                captures
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty()),
                captures.get(4).map(|m| m.as_str().trim().to_string()),
                captures.get(3).is_some(),
            ),
            None => (None, None, None, false),
        };

        let mut body_lines = Vec::new();
        let mut notes: Vec<Vec<&str>> = Vec::new();
        for &line in &rest {
            if let Some(captures) = NOTE_RE.captures(line) {
                notes.push(vec![captures.get(2).map_or("", |m| m.as_str())]);
            } else if let Some(note) = notes.last_mut() {
                note.push(line);
            } else {
                body_lines.push(line);
            }
        }

        let mut breaking_notes: Vec<String> = notes
            .iter()
            .filter_map(|note| normalize_note(&note.join("\n")))
            .collect();
        if bang && breaking_notes.is_empty() {
            if let Some(subject) = subject.as_ref().filter(|s| !s.is_empty()) {
                breaking_notes.push(subject.clone());
            }
        }

        let body = body_lines.join("\n").trim().to_string();

        ClassifiedCommit {
            sha: commit.sha.clone(),
            raw_message: commit.message.clone(),
            header,
            r#type,
            scope,
            subject,
            body: (!body.is_empty()).then_some(body),
            breaking_notes,
            references: parse_references(message),
            revert: parse_revert(message),
        }
    }

    pub fn is_breaking(&self) -> bool {
        !self.breaking_notes.is_empty()
    }

    pub fn is_feature(&self) -> bool {
        matches!(self.r#type.as_deref(), Some("feat" | "feature"))
    }

    pub fn is_conventional(&self) -> bool {
        self.r#type.is_some()
    }
}

/// Keep only the first line of a breaking change note
fn normalize_note(text: &str) -> Option<String> {
    text.trim()
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

fn parse_references(message: &str) -> Vec<Reference> {
    let mut references: Vec<Reference> = Vec::new();
    for captures in REFERENCE_RE.captures_iter(message) {
        let Some(issue) = captures.get(4).and_then(|m| m.as_str().parse::<u64>().ok()) else {
            continue;
        };
        let reference = Reference {
            action: captures.get(1).map(|m| m.as_str().to_lowercase()),
            owner: captures.get(2).map(|m| m.as_str().to_string()),
            repository: captures.get(3).map(|m| m.as_str().to_string()),
            issue,
        };
        let duplicate = references.iter().any(|r| {
            r.issue == reference.issue
                && r.owner == reference.owner
                && r.repository == reference.repository
        });
        if !duplicate {
            references.push(reference);
        }
    }
    references
}

fn parse_revert(message: &str) -> Option<Revert> {
    let captures = REVERT_RE.captures(message)?;
    Some(Revert {
        header: captures.get(1)?.as_str().trim().to_string(),
        sha: captures.get(2)?.as_str().to_string(),
    })
}

/// Shas match when one is an abbreviation of the other
fn same_commit(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.starts_with(b) || b.starts_with(a))
}

/// Drop reverted commits together with the commits that revert them
///
/// Only pairs where both sides are present in `commits` are removed.
pub fn filter_reverted(commits: Vec<ClassifiedCommit>) -> Vec<ClassifiedCommit> {
    let reverted: Vec<(String, String)> = commits
        .iter()
        .filter_map(|c| {
            let revert = c.revert.as_ref()?;
            commits
                .iter()
                .any(|other| same_commit(&other.sha, &revert.sha))
                .then(|| (c.sha.clone(), revert.sha.clone()))
        })
        .collect();

    if reverted.is_empty() {
        return commits;
    }

    commits
        .into_iter()
        .filter(|c| {
            !reverted.iter().any(|(revert_sha, target)| {
                &c.sha == revert_sha || same_commit(&c.sha, target)
            })
        })
        .collect()
}
