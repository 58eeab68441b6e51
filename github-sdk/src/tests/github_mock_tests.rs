//! Mock-API tests for the GitHub client and its endpoint helpers

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::GitHubClient;
    use crate::progress::NoopSink;
    use crate::rate_limit::RateBudget;
    use crate::resilience::RetryPolicy;
    use crate::tests::RecordingSink;

    fn test_client(server: &MockServer) -> GitHubClient {
        GitHubClient::builder()
            .base_url(server.uri())
            .token("test-token")
            .timeout(5)
            .retry(RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(10),
                ..RetryPolicy::default()
            })
            .rate_budget(Arc::new(RateBudget::new(1_000, Duration::from_secs(1))))
            .build()
            .expect("client must build")
    }

    #[tokio::test]
    async fn fetches_repository_metadata() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "hello",
                "full_name": "octocat/hello",
                "stargazers_count": 1234,
                "forks_count": 56,
                "watchers_count": 1234,
                "open_issues_count": 42,
                "language": "Rust",
                "archived": false,
                "disabled": false,
                "default_branch": "main",
                "pushed_at": "2024-05-01T10:00:00Z"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let repo = client
            .repository("octocat", "hello", &NoopSink)
            .await
            .expect("metadata must parse");

        assert_eq!(repo.stargazers_count, 1234);
        assert_eq!(repo.forks_count, 56);
        assert_eq!(repo.language.as_deref(), Some("Rust"));
        assert!(!repo.archived);
    }

    #[tokio::test]
    async fn rejected_credentials_surface_as_authentication() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .repository("octocat", "hello", &NoopSink)
            .await
            .expect_err("401 must fail");

        assert_eq!(err.code(), "authentication");
        assert!(err.to_string().contains("Bad credentials"));
    }

    #[tokio::test]
    async fn low_remaining_quota_emits_an_advisory() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-remaining", "42")
                    .set_body_json(json!({"stargazers_count": 1})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let sink = RecordingSink::new();

        let success = client
            .get("/repos/octocat/hello", None, &sink)
            .await
            .expect("call must succeed despite the advisory");

        assert_eq!(success.rate_remaining, Some(42));
        let warnings = sink.messages("warn").await;
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("42"));
    }

    #[tokio::test]
    async fn healthy_quota_stays_quiet() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-remaining", "4200")
                    .set_body_json(json!({})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let sink = RecordingSink::new();

        client
            .get("/repos/octocat/hello", None, &sink)
            .await
            .expect("call must succeed");

        assert!(sink.messages("warn").await.is_empty());
    }

    #[tokio::test]
    async fn each_call_consumes_exactly_one_permit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let budget = Arc::new(RateBudget::new(100, Duration::from_secs(60)));
        let client = GitHubClient::builder()
            .base_url(server.uri())
            .timeout(5)
            .rate_budget(Arc::clone(&budget))
            .build()
            .expect("client must build");

        client
            .get("/repos/octocat/hello", None, &NoopSink)
            .await
            .expect("first call");
        assert_eq!(budget.in_use().await, 1);

        client
            .get("/repos/octocat/hello", None, &NoopSink)
            .await
            .expect("repeat call");
        assert_eq!(budget.in_use().await, 2);
    }

    #[tokio::test]
    async fn counts_open_pull_requests_via_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", "repo:octocat/hello type:pr state:open"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 17,
                "items": []
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let count = client
            .open_pull_request_count("octocat", "hello", &NoopSink)
            .await
            .expect("search must succeed");

        assert_eq!(count, 17);
    }

    #[tokio::test]
    async fn latest_commit_handles_empty_histories() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/empty/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "sha": "abc123",
                "commit": {
                    "author": {"name": "Mona", "date": "2024-05-01T10:00:00Z"},
                    "message": "fix: a thing"
                },
                "author": {"login": "mona"}
            }])))
            .mount(&server)
            .await;

        let client = test_client(&server);

        let none = client
            .latest_commit("octocat", "empty", &NoopSink)
            .await
            .expect("empty history is not an error");
        assert!(none.is_none());

        let some = client
            .latest_commit("octocat", "hello", &NoopSink)
            .await
            .expect("commit must parse")
            .expect("one commit expected");
        assert_eq!(some.commit.author.name.as_deref(), Some("Mona"));
    }

    #[tokio::test]
    async fn collects_commits_across_pages() {
        let server = MockServer::start().await;

        let page_of = |n: usize| -> serde_json::Value {
            json!((0..n)
                .map(|i| json!({
                    "sha": format!("sha{}", i),
                    "commit": {"author": {"name": "Mona", "date": "2024-05-01T10:00:00Z"}}
                }))
                .collect::<Vec<_>>())
        };

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/commits"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(100)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/commits"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(30)))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let commits = client
            .collect_commits("octocat", "hello", None, None, &NoopSink)
            .await
            .expect("pagination must succeed");

        // A short page ends the walk; page 3 is never requested.
        assert_eq!(commits.len(), 130);
    }

    #[tokio::test]
    async fn lists_branches_with_protection_flags() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "main", "protected": true},
                {"name": "dev", "protected": false}
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let branches = client
            .branches("octocat", "hello", &NoopSink)
            .await
            .expect("branches must parse");

        assert_eq!(branches.len(), 2);
        assert!(branches[0].protected);
        assert_eq!(branches[1].name.as_deref(), Some("dev"));
    }
}
