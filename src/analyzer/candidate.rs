use crate::analyzer::bump::BumpRecommender;
use crate::domain::commit::short_sha;
use crate::domain::prerelease::next_prerelease_of;
use crate::domain::version::{increment, is_pre_major};
use crate::domain::{BumpLevel, ClassifiedCommit, Commit, Tag};
use crate::error::Result;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

static RELEASE_AS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)release-as:\s*v?([0-9]+\.[0-9]+\.[0-9a-z]+(?:-[0-9a-z.]+)?)\s*")
        .expect("valid release-as pattern")
});

/// Version used when the repository has never been released
pub const FIRST_RELEASE: &str = "1.0.0";

/// How the next version was decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPath {
    /// A commit pinned the version with `release-as:`
    ReleaseAs { sha: String },
    /// The prior tag's pre-release counter was incremented
    PreRelease,
    /// The prior version was bumped by commit severity
    Bump(BumpLevel),
    /// No prior release exists
    FirstRelease,
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPath::ReleaseAs { sha } => {
                write!(f, "release-as in {}", short_sha(sha))
            }
            ResolutionPath::PreRelease => write!(f, "pre-release increment"),
            ResolutionPath::Bump(level) => write!(f, "{} bump", level),
            ResolutionPath::FirstRelease => write!(f, "first release"),
        }
    }
}

/// The version the next release should carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCandidate {
    pub version: String,
    /// Name of the tag the release follows; unset for a first release
    pub previous_tag: Option<String>,
    pub path: ResolutionPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateOptions {
    pub prerelease: bool,
    pub bump_minor_pre_major: bool,
}

impl Default for CandidateOptions {
    fn default() -> Self {
        CandidateOptions {
            prerelease: false,
            bump_minor_pre_major: true,
        }
    }
}

/// Version pinned by the first commit carrying a `release-as:` directive
pub fn release_as(commits: &[Commit]) -> Option<(String, &Commit)> {
    commits.iter().find_map(|commit| {
        RELEASE_AS_RE
            .captures(&commit.message)
            .and_then(|captures| captures.get(1))
            .map(|version| (version.as_str().to_string(), commit))
    })
}

/// Decide the next version from the commits since `latest_tag`
///
/// Paths are tried in order: an explicit `release-as:` directive, then a
/// pre-release increment (only when asked for and a prior tag exists), then
/// a bump by commit severity, and finally [FIRST_RELEASE].
pub fn resolve(
    commits: &[Commit],
    latest_tag: Option<&Tag>,
    options: CandidateOptions,
) -> Result<ReleaseCandidate> {
    let previous_tag = latest_tag.map(|tag| tag.name.clone());

    let (version, path) = if let Some((version, commit)) = release_as(commits) {
        (
            version,
            ResolutionPath::ReleaseAs {
                sha: commit.sha.clone(),
            },
        )
    } else {
        match latest_tag {
            Some(tag) if options.prerelease => {
                (next_prerelease_of(&tag.version), ResolutionPath::PreRelease)
            }
            Some(tag) => {
                let classified: Vec<ClassifiedCommit> =
                    commits.iter().map(ClassifiedCommit::parse).collect();
                let pre_major = options.bump_minor_pre_major && is_pre_major(&tag.version);
                let recommendation = BumpRecommender::analyze(&classified, pre_major);
                info!(from = %tag.version, %recommendation, "bumping version");
                (
                    increment(&tag.version, recommendation.level)?.to_string(),
                    ResolutionPath::Bump(recommendation.level),
                )
            }
            None => (FIRST_RELEASE.to_string(), ResolutionPath::FirstRelease),
        }
    };

    info!(%version, previous = ?previous_tag, path = %path, "resolved release candidate");
    Ok(ReleaseCandidate {
        version,
        previous_tag,
        path,
    })
}
