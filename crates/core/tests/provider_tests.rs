// ═══════════════════════════════════════════════════════════════════
// Provider Tests — ThreadsApiProvider against a mock HTTP server
// ═══════════════════════════════════════════════════════════════════

use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

use threads_feed_core::config::UpstreamConfig;
use threads_feed_core::errors::CoreError;
use threads_feed_core::providers::threads_api::ThreadsApiProvider;
use threads_feed_core::providers::traits::SearchProvider;

const SEARCH_PATH: &str = "/api/search/recent";
const HOST: &str = "threads-api4.p.rapidapi.com";

fn config(base_url: String) -> UpstreamConfig {
    UpstreamConfig {
        api_key: Some("test-key".into()),
        api_host: HOST.into(),
        base_url,
        timeout: Duration::from_secs(5),
        retries: 2,
        retry_delay: Duration::from_millis(10),
        probe_timeout: Duration::from_secs(2),
    }
}

fn search_body() -> String {
    json!({
        "data": { "searchResults": {
            "edges": [
                { "cursor": "c1", "node": { "thread": { "thread_items": [
                    { "post": { "pk": "100", "caption": { "text": "BTC to the moon" }, "like_count": 12 } }
                ] } } },
                { "cursor": "c2", "node": { "thread": { "thread_items": [
                    { "post": { "pk": 200, "user": { "username": "bob" } } }
                ] } } }
            ],
            "page_info": { "has_next_page": true, "end_cursor": "c2" }
        } }
    })
    .to_string()
}

/// Accepts connections and never answers, so every request runs into its timeout.
async fn silent_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

// ═══════════════════════════════════════════════════════════════════
// search
// ═══════════════════════════════════════════════════════════════════

mod search {
    use super::*;

    #[tokio::test]
    async fn sends_auth_headers_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::UrlEncoded("query".into(), "Bitcoin".into()))
            .match_header("x-rapidapi-key", "test-key")
            .match_header("x-rapidapi-host", HOST)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(search_body())
            .expect(1)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        let page = provider.search("Bitcoin").await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].id, "100");
        assert_eq!(page.posts[0].content, "BTC to the moon");
        assert_eq!(page.posts[0].cursor.as_deref(), Some("c1"));
        assert_eq!(page.posts[1].id, "200");
        assert_eq!(page.posts[1].user.username, "bob");
        assert!(page.pagination.has_next_page);
        assert_eq!(page.pagination.end_cursor.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn query_with_spaces_is_encoded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::UrlEncoded("query".into(), "Bitcoin & ETH".into()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        let page = provider.search("Bitcoin & ETH").await.unwrap();

        mock.assert_async().await;
        assert!(page.posts.is_empty());
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(search_body())
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(format!("{}/", server.url())));
        assert!(provider.search("XRP").await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .expect(1)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        let err = provider.search("DOGE").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, CoreError::RateLimited { .. }));
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn server_errors_use_the_whole_retry_budget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(UpstreamConfig {
            retries: 3,
            ..config(server.url())
        });
        let err = provider.search("BTC").await.unwrap_err();

        mock.assert_async().await;
        match err {
            CoreError::UpstreamUnavailable { message, .. } => {
                assert!(message.contains("500"), "{message}");
                assert!(message.contains("after 3 attempts"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_retried_then_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .expect(2)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        let err = provider.search("XRP").await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn zero_retries_still_makes_one_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(UpstreamConfig {
            retries: 0,
            ..config(server.url())
        });
        assert!(provider.search("BTC").await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        let provider = ThreadsApiProvider::new(UpstreamConfig {
            retries: 1,
            ..config("http://127.0.0.1:1".into())
        });
        let err = provider.search("BTC").await.unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_into_unavailable() {
        let provider = ThreadsApiProvider::new(UpstreamConfig {
            timeout: Duration::from_millis(200),
            ..config(silent_upstream().await)
        });
        let err = provider.search("Bitcoin").await.unwrap_err();

        assert!(!err.is_rate_limited());
        match err {
            CoreError::UpstreamUnavailable { message, .. } => {
                assert!(message.contains("after 2 attempts"), "{message}");
                assert!(!message.contains("127.0.0.1"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_fast() {
        let provider = ThreadsApiProvider::new(UpstreamConfig {
            api_key: None,
            ..config("http://127.0.0.1:1".into())
        });
        let err = provider.search("BTC").await.unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let provider = ThreadsApiProvider::new(config("http://127.0.0.1:1".into()));
        let err = provider.search("  ").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn name_is_stable() {
        let provider = ThreadsApiProvider::new(UpstreamConfig::default());
        assert_eq!(provider.name(), "Threads API");
    }
}

// ═══════════════════════════════════════════════════════════════════
// check_limit
// ═══════════════════════════════════════════════════════════════════

mod check_limit {
    use super::*;

    #[tokio::test]
    async fn probe_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::UrlEncoded("query".into(), "test".into()))
            .match_header("x-rapidapi-key", "test-key")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        assert!(provider.check_limit().await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn probe_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        let err = provider.check_limit().await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn probe_server_error_is_not_a_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let provider = ThreadsApiProvider::new(config(server.url()));
        let err = provider.check_limit().await.unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn probe_timeout_is_unavailable() {
        let provider = ThreadsApiProvider::new(UpstreamConfig {
            probe_timeout: Duration::from_millis(200),
            ..config(silent_upstream().await)
        });
        let err = provider.check_limit().await.unwrap_err();

        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn probe_without_key_is_configuration_error() {
        let provider = ThreadsApiProvider::new(UpstreamConfig::default());
        let err = provider.check_limit().await.unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
