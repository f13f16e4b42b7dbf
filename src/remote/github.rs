//! GitHub transport
//!
//! Commit history comes from the GraphQL API, which is the only way to get a
//! commit's pull-request files alongside the commit in one request. Tags and
//! the default branch come from the REST API.

use crate::domain::{Commit, RepositoryRef};
use crate::error::{ChangelogError, Result};
use crate::remote::{
    CommitPage, CommitPageRequest, HistoryTransport, TagPage, TagRef, TransportError,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Files fetched per associated pull request
pub const MAX_FILES_PER_COMMIT: usize = 64;

const TAGS_PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("git-changelog/", env!("CARGO_PKG_VERSION"));

const HISTORY_QUERY: &str = r#"query commitHistory($owner: String!, $repo: String!, $branch: String!, $perPage: Int!, $cursor: String, $path: String, $maxFiles: Int!) {
  repository(owner: $owner, name: $repo) {
    ref(qualifiedName: $branch) {
      target {
        ... on Commit {
          history(first: $perPage, after: $cursor, path: $path) {
            nodes {
              oid
              message
              associatedPullRequests(first: 1) {
                nodes {
                  number
                  mergeCommit { oid }
                  files(first: $maxFiles) { nodes { path } }
                }
              }
            }
            pageInfo { endCursor hasNextPage }
          }
        }
      }
    }
  }
}"#;

/// How the transport gets its HTTP client
pub enum ClientMode {
    /// Build a client here, authenticating with `token`
    ///
    /// With a `proxy_key` the token is sent without the `token ` prefix and
    /// the key is appended to every request as `?key=`.
    Standalone {
        token: Option<String>,
        proxy_key: Option<String>,
    },
    /// Use a client that already carries its own authentication
    External(Client),
}

/// [HistoryTransport] backed by the GitHub API
pub struct GitHubTransport {
    client: Client,
    api_url: String,
    repository: RepositoryRef,
    authorization: Option<String>,
    proxy_key: Option<String>,
}

impl GitHubTransport {
    pub fn new(
        repository: RepositoryRef,
        api_url: impl Into<String>,
        mode: ClientMode,
        timeout: Duration,
    ) -> Result<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        match mode {
            ClientMode::Standalone { token, proxy_key } => {
                let client = Client::builder()
                    .timeout(timeout)
                    .user_agent(USER_AGENT)
                    .build()
                    .map_err(|e| {
                        ChangelogError::config(format!("cannot build HTTP client: {}", e))
                    })?;
                let authorization = token.map(|token| match proxy_key {
                    Some(_) => token,
                    None => format!("token {}", token),
                });
                Ok(GitHubTransport {
                    client,
                    api_url,
                    repository,
                    authorization,
                    proxy_key,
                })
            }
            ClientMode::External(client) => Ok(GitHubTransport {
                client,
                api_url,
                repository,
                authorization: None,
                proxy_key: None,
            }),
        }
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match &self.authorization {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        };
        match &self.proxy_key {
            Some(key) => builder.query(&[("key", key)]),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, TransportError> {
        let response = self
            .decorate(builder)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::new(
            Some(status.as_u16()),
            format!("GitHub request failed: {}", body.trim()),
        ))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<(T, bool), TransportError> {
        let builder = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .query(query);
        let response = self.send(builder).await?;
        let has_next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("rel=\"next\""))
            .unwrap_or(false);
        let body = response.json().await.map_err(transport_error)?;
        Ok((body, has_next))
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    TransportError::new(err.status().map(|s| s.as_u16()), err.to_string())
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct HistoryData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    #[serde(rename = "ref")]
    git_ref: Option<RefNode>,
}

#[derive(Deserialize)]
struct RefNode {
    target: Option<TargetNode>,
}

#[derive(Deserialize)]
struct TargetNode {
    history: Option<HistoryConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryConnection {
    #[serde(default)]
    nodes: Vec<CommitNode>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    oid: String,
    message: String,
    associated_pull_requests: Option<Nodes<PullRequestNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    number: u64,
    merge_commit: Option<OidNode>,
    files: Option<Nodes<FileNode>>,
}

#[derive(Deserialize)]
struct OidNode {
    oid: String,
}

#[derive(Deserialize)]
struct FileNode {
    path: String,
}

impl CommitNode {
    /// Files of the pull request that merged this commit, if any
    fn into_commit(self) -> Commit {
        let files = self
            .associated_pull_requests
            .and_then(|prs| prs.nodes.into_iter().next())
            .filter(|pr| {
                pr.merge_commit
                    .as_ref()
                    .map(|merge| merge.oid == self.oid)
                    .unwrap_or(false)
            })
            .map(|pr| {
                debug!(pr = pr.number, sha = %self.oid, "commit merged by pull request");
                pr.files
                    .map(|files| files.nodes.into_iter().map(|f| f.path).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        Commit::new(self.oid, self.message).with_files(files)
    }
}

#[derive(Deserialize)]
struct TagNode {
    name: String,
    commit: TagCommit,
}

#[derive(Deserialize)]
struct TagCommit {
    sha: String,
}

#[derive(Deserialize)]
struct RepositoryInfo {
    default_branch: String,
}

#[async_trait]
impl HistoryTransport for GitHubTransport {
    async fn fetch_commit_page(
        &self,
        request: &CommitPageRequest,
    ) -> std::result::Result<CommitPage, TransportError> {
        let body = json!({
            "query": HISTORY_QUERY,
            "variables": {
                "owner": self.repository.owner,
                "repo": self.repository.repo,
                "branch": request.branch,
                "perPage": request.page_size,
                "cursor": request.cursor,
                "path": request.path,
                "maxFiles": MAX_FILES_PER_COMMIT,
            }
        });
        let builder = self
            .client
            .post(format!("{}/graphql", self.api_url))
            .json(&body);
        let response: GraphQlResponse<HistoryData> = self
            .send(builder)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        if let Some(error) = response.errors.first() {
            return Err(TransportError::new(None, error.message.clone()));
        }

        let history = response
            .data
            .and_then(|data| data.repository)
            .and_then(|repository| repository.git_ref)
            .and_then(|git_ref| git_ref.target)
            .and_then(|target| target.history)
            .ok_or_else(|| {
                TransportError::new(
                    None,
                    format!(
                        "branch '{}' not found in {}",
                        request.branch, self.repository
                    ),
                )
            })?;

        Ok(CommitPage {
            commits: history
                .nodes
                .into_iter()
                .map(CommitNode::into_commit)
                .collect(),
            end_cursor: history.page_info.end_cursor,
            has_next_page: history.page_info.has_next_page,
        })
    }

    async fn fetch_tag_page(
        &self,
        cursor: Option<&str>,
    ) -> std::result::Result<TagPage, TransportError> {
        let page: usize = match cursor {
            Some(cursor) => cursor.parse().map_err(|_| {
                TransportError::new(None, format!("invalid tag page cursor '{}'", cursor))
            })?,
            None => 1,
        };
        let url = format!(
            "{}/repos/{}/{}/tags",
            self.api_url, self.repository.owner, self.repository.repo
        );
        let (tags, has_next_page): (Vec<TagNode>, bool) = self
            .get_json(
                &url,
                &[
                    ("per_page", TAGS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        Ok(TagPage {
            tags: tags
                .into_iter()
                .map(|tag| TagRef::new(tag.name, tag.commit.sha))
                .collect(),
            end_cursor: has_next_page.then(|| (page + 1).to_string()),
            has_next_page,
        })
    }

    async fn resolve_default_branch(&self) -> std::result::Result<String, TransportError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_url, self.repository.owner, self.repository.repo
        );
        let (info, _): (RepositoryInfo, bool) = self.get_json(&url, &[]).await?;
        debug!(
            repository = %self.repository,
            branch = %info.default_branch,
            "resolved default branch"
        );
        Ok(info.default_branch)
    }
}
