//! GitHub transport against a mock HTTP server
//!
//! Covers:
//! - GraphQL commit pages and pull request files
//! - Retry of 502 responses and immediate failure on other statuses
//! - REST tag pagination through the Link header
//! - Default branch lookup
//! - Proxy key authentication

use git_changelog::config::Config;
use git_changelog::domain::RepositoryRef;
use git_changelog::remote::{
    ClientMode, CommitPageRequest, GitHubTransport, HistoryClient, HistoryTransport,
};
use git_changelog::{generate_changelog, ChangelogError, GenerateChangelogRequest};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn transport(server: &MockServer, token: Option<&str>, proxy_key: Option<&str>) -> GitHubTransport {
    GitHubTransport::new(
        RepositoryRef::new("acme", "widgets"),
        server.uri(),
        ClientMode::Standalone {
            token: token.map(str::to_string),
            proxy_key: proxy_key.map(str::to_string),
        },
        Duration::from_secs(5),
    )
    .expect("client builds")
}

/// Helper to create a GraphQL history response
fn history_response(commits: &[(&str, &str)], end_cursor: Option<&str>, has_next: bool) -> Value {
    let nodes: Vec<Value> = commits
        .iter()
        .map(|(oid, message)| {
            json!({
                "oid": oid,
                "message": message,
                "associatedPullRequests": {"nodes": []}
            })
        })
        .collect();
    json!({
        "data": {
            "repository": {
                "ref": {
                    "target": {
                        "history": {
                            "nodes": nodes,
                            "pageInfo": {"endCursor": end_cursor, "hasNextPage": has_next}
                        }
                    }
                }
            }
        }
    })
}

fn page_request(cursor: Option<&str>) -> CommitPageRequest {
    CommitPageRequest {
        branch: "main".to_string(),
        cursor: cursor.map(str::to_string),
        page_size: 2,
        path: None,
    }
}

#[tokio::test]
async fn test_commit_page_with_pull_request_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"repository": {"ref": {"target": {"history": {
                "nodes": [{
                    "oid": "abc",
                    "message": "feat: add thing (#7)",
                    "associatedPullRequests": {"nodes": [{
                        "number": 7,
                        "mergeCommit": {"oid": "abc"},
                        "files": {"nodes": [{"path": "src/lib.rs"}]}
                    }]}
                }],
                "pageInfo": {"endCursor": "Y3Vyc29y", "hasNextPage": true}
            }}}}}
        })))
        .mount(&server)
        .await;

    let page = transport(&server, Some("secret"), None)
        .fetch_commit_page(&page_request(None))
        .await
        .unwrap();

    assert_eq!(page.commits.len(), 1);
    assert_eq!(page.commits[0].sha, "abc");
    assert_eq!(page.commits[0].files, vec!["src/lib.rs"]);
    assert_eq!(page.end_cursor.as_deref(), Some("Y3Vyc29y"));
    assert!(page.has_next_page);
}

#[tokio::test]
async fn test_history_request_variables() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(history_response(&[], None, false)),
        )
        .mount(&server)
        .await;

    let mut request = page_request(Some("abc"));
    request.path = Some("packages/core".to_string());
    transport(&server, None, None)
        .fetch_commit_page(&request)
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let body: Value = received[0].body_json().unwrap();
    assert_eq!(body["variables"]["owner"], "acme");
    assert_eq!(body["variables"]["repo"], "widgets");
    assert_eq!(body["variables"]["branch"], "main");
    assert_eq!(body["variables"]["cursor"], "abc");
    assert_eq!(body["variables"]["perPage"], 2);
    assert_eq!(body["variables"]["path"], "packages/core");
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_502_retried_until_success() {
    let server = MockServer::start().await;

    // First two attempts fail, third succeeds
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_response(
            &[("c3", "fix: c"), ("c2", "feat: b"), ("c1", "chore: a")],
            None,
            false,
        )))
        .mount(&server)
        .await;

    let client = HistoryClient::new(transport(&server, None, None))
        .with_branch(Some("main".to_string()));
    let commits = client.fetch_commits_since("c1", 100, None).await.unwrap();

    let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(shas, vec!["c3", "c2"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_502_three_times_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let client = HistoryClient::new(transport(&server, None, None))
        .with_branch(Some("main".to_string()));
    let err = client.fetch_commits_since("c1", 100, None).await.unwrap_err();

    assert!(matches!(err, ChangelogError::Transport(ref e) if e.status == Some(502)));
}

#[tokio::test]
async fn test_other_status_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HistoryClient::new(transport(&server, Some("wrong"), None))
        .with_branch(Some("main".to_string()));
    let err = client.fetch_commits_since("c1", 100, None).await.unwrap_err();

    match err {
        ChangelogError::Transport(e) => {
            assert_eq!(e.status, Some(401));
            assert!(e.message.contains("Bad credentials"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_graphql_errors_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "Could not resolve to a Repository"}]
        })))
        .mount(&server)
        .await;

    let err = transport(&server, None, None)
        .fetch_commit_page(&page_request(None))
        .await
        .unwrap_err();
    assert_eq!(err.status, None);
    assert!(err.message.contains("Could not resolve"));
}

#[tokio::test]
async fn test_missing_branch_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"repository": {"ref": null}}})),
        )
        .mount(&server)
        .await;

    let err = transport(&server, None, None)
        .fetch_commit_page(&page_request(None))
        .await
        .unwrap_err();
    assert!(err.message.contains("branch 'main' not found"));
}

#[tokio::test]
async fn test_tag_pages_follow_link_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/tags"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    "<https://api.github.com/repositories/1/tags?page=2>; rel=\"next\"",
                )
                .set_body_json(json!([{"name": "v1.1.0", "commit": {"sha": "bbb"}}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/tags"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"name": "v1.0.0", "commit": {"sha": "aaa"}}])),
        )
        .mount(&server)
        .await;

    let client = HistoryClient::new(transport(&server, None, None));
    let tags = client.all_tags().await.unwrap();

    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["v1.1.0", "v1.0.0"]);
    assert_eq!(tags[1].sha, "aaa");
}

#[tokio::test]
async fn test_default_branch_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"full_name": "acme/widgets", "default_branch": "trunk"})),
        )
        .mount(&server)
        .await;

    let branch = transport(&server, None, None)
        .resolve_default_branch()
        .await
        .unwrap();
    assert_eq!(branch, "trunk");
}

#[tokio::test]
async fn test_proxy_key_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .and(query_param("key", "proxy-key"))
        .and(header("authorization", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"default_branch": "main"})))
        .expect(1)
        .mount(&server)
        .await;

    let branch = transport(&server, Some("secret"), Some("proxy-key"))
        .resolve_default_branch()
        .await
        .unwrap();
    assert_eq!(branch, "main");
}

#[tokio::test]
async fn test_generate_changelog_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "v1.2.0", "commit": {"sha": "c1"}},
            {"name": "not-a-version", "commit": {"sha": "c0"}}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"default_branch": "main"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_response(
            &[
                ("c3", "fix: handle empty input"),
                ("c2", "feat(api): add list endpoint"),
                ("c1", "chore: release 1.2.0"),
            ],
            None,
            false,
        )))
        .mount(&server)
        .await;

    let request = GenerateChangelogRequest {
        repository: "https://github.com/acme/widgets.git".to_string(),
        branch: None,
        sha_or_ref: None,
    };
    let response = generate_changelog(
        transport(&server, None, None),
        &request,
        &Config::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(response.candidate.version, "1.3.0");
    assert_eq!(response.commit_count, 2);
    assert!(response.markdown.contains("### Features"));
    assert!(response.markdown.contains("* **api:** add list endpoint ([c2]"));
    assert!(response.markdown.contains("* handle empty input ([c3]"));
}
