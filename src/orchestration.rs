//! Changelog generation workflow
//!
//! Ties the pieces together for one request: find where history starts,
//! fetch the commits since then, decide the version and render markdown.
//! Callers outside this crate (the binary, an API layer) only need
//! [generate_changelog] or [generate_github_changelog].

use crate::analyzer::{candidate, ReleaseCandidate, TagResolver};
use crate::boundary::BoundaryWarning;
use crate::changelog::{ChangelogContext, ChangelogRenderer};
use crate::config::Config;
use crate::domain::{RepositoryRef, Tag};
use crate::error::{ChangelogError, Result};
use crate::remote::{ClientMode, GitHubTransport, HistoryClient, HistoryTransport};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// What to generate a changelog for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateChangelogRequest {
    /// `owner/repo` or a GitHub URL
    pub repository: String,

    /// Branch to walk; the repository's default branch when unset
    pub branch: Option<String>,

    /// Release tag version (e.g. `v1.2.0`) or commit sha to start from
    pub sha_or_ref: Option<String>,
}

/// Result of a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogResponse {
    /// Starting reference echoed back from the request
    pub shas: Option<String>,

    pub markdown: String,

    pub candidate: ReleaseCandidate,

    /// Number of commits the changelog covers
    pub commit_count: usize,

    /// Recoverable conditions met along the way
    pub warnings: Vec<BoundaryWarning>,
}

/// Where commit traversal stops, and the tag the new version builds on
#[derive(Debug, Clone, PartialEq, Eq)]
struct StartPoint {
    sha: String,
    previous: Option<Tag>,
}

/// Generate a changelog through any [HistoryTransport]
///
/// # Errors
///
/// * `UnparsableRepository` - the repository reference is malformed
/// * `UnresolvableStartPoint` - neither a tag nor a usable sha bounds the history
/// * `Transport` / `Cancelled` - fetching failed or was aborted
/// * `MalformedVersion` / `Template` - the version or markdown could not be produced
pub async fn generate_changelog<T: HistoryTransport>(
    transport: T,
    request: &GenerateChangelogRequest,
    config: &Config,
    cancellation: Option<CancellationToken>,
) -> Result<ChangelogResponse> {
    let repository = RepositoryRef::parse(&request.repository)?;

    let mut client = HistoryClient::new(transport)
        .with_branch(request.branch.clone())
        .with_retry_delay(config.github.retry_delay());
    if let Some(token) = cancellation {
        client = client.with_cancellation(token);
    }

    let start = resolve_start_point(&client, request.sha_or_ref.as_deref(), config).await?;
    info!(
        repository = %repository,
        start = %start.sha,
        previous = ?start.previous.as_ref().map(|t| t.name.as_str()),
        "resolved starting point"
    );

    let commits = client
        .fetch_commits_since(&start.sha, config.github.page_size, None)
        .await?;
    let mut warnings = client.take_warnings();
    if commits.is_empty() {
        warnings.push(BoundaryWarning::NoNewCommits {
            since: start.sha.clone(),
        });
    }

    let candidate = candidate::resolve(
        &commits,
        start.previous.as_ref(),
        config.versioning.candidate_options(),
    )?;

    let renderer =
        ChangelogRenderer::with_templates(config.changelog.layout(), &config.changelog.templates())?;
    let context = ChangelogContext {
        host: config.github.host.clone(),
        owner: repository.owner.clone(),
        repository: repository.repo.clone(),
        version: candidate.version.clone(),
        previous_tag: candidate.previous_tag.clone(),
        current_tag: format!(
            "{}v{}",
            config.versioning.tag_prefix.as_deref().unwrap_or(""),
            candidate.version
        ),
        link_compare: config.changelog.link_compare,
        date: None,
    };
    let markdown = renderer.render(&commits, &context)?;

    Ok(ChangelogResponse {
        shas: request.sha_or_ref.clone(),
        markdown,
        candidate,
        commit_count: commits.len(),
        warnings,
    })
}

/// Generate a changelog for a GitHub repository
pub async fn generate_github_changelog(
    request: &GenerateChangelogRequest,
    config: &Config,
    mode: ClientMode,
    cancellation: Option<CancellationToken>,
) -> Result<ChangelogResponse> {
    let repository = RepositoryRef::parse(&request.repository)?;
    let transport = GitHubTransport::new(
        repository,
        config.github.api_url.clone(),
        mode,
        config.github.request_timeout(),
    )?;
    generate_changelog(transport, request, config, cancellation).await
}

/// Decide where history traversal stops
///
/// A reference naming a released version starts at that tag. Any other
/// reference is taken as a commit sha with no prior release, unless it looks
/// like a version (contains a `.`) in which case no such release exists.
/// Without a reference the latest applicable tag is used; continuing a
/// pre-release chain makes pre-release tags applicable.
async fn resolve_start_point<T: HistoryTransport>(
    client: &HistoryClient<T>,
    sha_or_ref: Option<&str>,
    config: &Config,
) -> Result<StartPoint> {
    let resolver = TagResolver::new(client);
    let prefix = config.versioning.tag_prefix.as_deref();
    let include_prerelease =
        config.versioning.include_prerelease || config.versioning.prerelease;

    match sha_or_ref.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => {
            if let Some(tag) = resolver.latest_tag(None, false, Some(reference)).await? {
                return Ok(StartPoint {
                    sha: tag.sha.clone(),
                    previous: Some(tag),
                });
            }
            if reference.contains('.') {
                return Err(ChangelogError::unresolvable_start_point(format!(
                    "no release tagged '{}'",
                    reference
                )));
            }
            Ok(StartPoint {
                sha: reference.to_string(),
                previous: None,
            })
        }
        None => match resolver.latest_tag(prefix, include_prerelease, None).await? {
            Some(tag) => Ok(StartPoint {
                sha: tag.sha.clone(),
                previous: Some(tag),
            }),
            None => Err(ChangelogError::unresolvable_start_point(
                "the repository has no release tags and no sha was given",
            )),
        },
    }
}
