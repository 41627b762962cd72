//! GitHub search client tests against a mock server

use aria_changelog::error::ChangelogError;
use aria_changelog::github::{GitHubClient, PullRequestSource, RepositoryRef};
use aria_changelog::types::UNKNOWN_AUTHOR;
use chrono::{TimeZone, Utc};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn widgets() -> RepositoryRef {
    RepositoryRef::parse("https://github.com/acme/widgets.git").expect("valid url")
}

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::with_base_url(&server.uri(), Duration::from_secs(5)).expect("client")
}

fn search_item(number: u64, title: &str, merged_at: &str) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "title": title,
        "body": format!("Body of {number}"),
        "html_url": format!("https://github.com/acme/widgets/pull/{number}"),
        "user": {"login": "octocat"},
        "pull_request": {"merged_at": merged_at}
    })
}

#[tokio::test]
async fn test_maps_items_in_response_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "is:pr is:merged repo:acme/widgets"))
        .and(query_param("sort", "merged"))
        .and(query_param("order", "desc"))
        .and(header("Authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 2,
            "items": [
                search_item(12, "Fix crash", "2024-05-02T10:00:00Z"),
                search_item(11, "Add export", "2024-05-01T10:00:00Z"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prs = client(&server)
        .fetch_merged_prs(&widgets(), "tok123", None)
        .await
        .expect("fetch succeeds");

    assert_eq!(prs.len(), 2);
    assert_eq!(prs[0].id, 12);
    assert_eq!(prs[0].title, "Fix crash");
    assert_eq!(prs[0].body.as_deref(), Some("Body of 12"));
    assert_eq!(prs[0].url, "https://github.com/acme/widgets/pull/12");
    assert_eq!(prs[0].author, "octocat");
    assert_eq!(
        prs[0].merged_at,
        Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).single()
    );
    assert_eq!(prs[1].id, 11);
}

#[tokio::test]
async fn test_since_is_sent_as_a_calendar_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param(
            "q",
            "is:pr is:merged repo:acme/widgets merged:>=2024-03-09",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"total_count": 0, "items": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let since = Utc.with_ymd_and_hms(2024, 3, 9, 18, 45, 0).single();
    let prs = client(&server)
        .fetch_merged_prs(&widgets(), "tok123", since)
        .await
        .expect("fetch succeeds");
    assert!(prs.is_empty());
}

#[tokio::test]
async fn test_missing_items_is_zero_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"total_count": 0})))
        .mount(&server)
        .await;

    let prs = client(&server)
        .fetch_merged_prs(&widgets(), "tok123", None)
        .await
        .expect("absent items is not an error");
    assert!(prs.is_empty());
}

#[tokio::test]
async fn test_missing_user_becomes_unknown_author() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 1,
            "items": [{
                "number": 5,
                "title": "Anonymous change",
                "html_url": "https://github.com/acme/widgets/pull/5",
                "user": null
            }]
        })))
        .mount(&server)
        .await;

    let prs = client(&server)
        .fetch_merged_prs(&widgets(), "tok123", None)
        .await
        .expect("fetch succeeds");
    assert_eq!(prs[0].author, UNKNOWN_AUTHOR);
    assert_eq!(prs[0].body, None);
    assert_eq!(prs[0].merged_at, None);
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "Validation Failed",
            "errors": [{"message": "The listed users cannot be searched", "code": "invalid"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_merged_prs(&widgets(), "tok123", None)
        .await
        .expect_err("422 is an error");

    assert_eq!(
        err,
        ChangelogError::UpstreamFetch {
            status: Some(422),
            message: "Validation Failed (invalid)".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unparseable_error_body_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_merged_prs(&widgets(), "bad-token", None)
        .await
        .expect_err("401 is an error");

    assert_eq!(err.upstream_status(), Some(401));
    assert_eq!(err.to_string(), "GitHub API Error: Unauthorized");
}

#[tokio::test]
async fn test_empty_owner_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let repo = RepositoryRef {
        owner: " ".to_string(),
        name: "widgets".to_string(),
    };
    let err = client(&server)
        .fetch_merged_prs(&repo, "tok123", None)
        .await
        .expect_err("empty owner");
    assert!(matches!(err, ChangelogError::InvalidRepositoryReference(_)));
}
