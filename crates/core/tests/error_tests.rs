// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError / ProxyError variants, Display, From impls
// ═══════════════════════════════════════════════════════════════════

use threads_feed_core::errors::CoreError;
use threads_feed_core::services::media_proxy::{MediaKind, ProxyError};

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn rate_limited() {
        let err = CoreError::RateLimited {
            provider: "Threads API".into(),
        };
        assert_eq!(err.to_string(), "Rate limited by Threads API");
    }

    #[test]
    fn upstream_unavailable() {
        let err = CoreError::UpstreamUnavailable {
            provider: "Threads API".into(),
            message: "HTTP 500".into(),
        };
        assert_eq!(err.to_string(), "Threads API unavailable: HTTP 500");
    }

    #[test]
    fn configuration() {
        let err = CoreError::Configuration("missing key".into());
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }

    #[test]
    fn validation_error() {
        let err = CoreError::ValidationError("empty query".into());
        assert_eq!(err.to_string(), "Validation failed: empty query");
    }

    #[test]
    fn feed_unavailable() {
        let err = CoreError::FeedUnavailable {
            rate_limited: true,
            message: "everything failed".into(),
        };
        assert_eq!(err.to_string(), "Feed unavailable: everything failed");
    }

    #[test]
    fn missing_media_url() {
        assert_eq!(
            ProxyError::MissingUrl(MediaKind::Image).to_string(),
            "Image URL is required"
        );
        assert_eq!(
            ProxyError::MissingUrl(MediaKind::Video).to_string(),
            "Video URL is required"
        );
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn rate_limit_detection() {
        assert!(CoreError::RateLimited {
            provider: "x".into()
        }
        .is_rate_limited());
        assert!(CoreError::FeedUnavailable {
            rate_limited: true,
            message: String::new()
        }
        .is_rate_limited());
        assert!(!CoreError::FeedUnavailable {
            rate_limited: false,
            message: String::new()
        }
        .is_rate_limited());
        assert!(!CoreError::UpstreamUnavailable {
            provider: "x".into(),
            message: "HTTP 429 somewhere in text".into()
        }
        .is_rate_limited());
        assert!(!CoreError::Network("timeout".into()).is_rate_limited());
    }

    #[test]
    fn proxy_status_codes() {
        assert_eq!(ProxyError::MissingUrl(MediaKind::Image).status().as_u16(), 400);
        assert_eq!(ProxyError::InvalidUrl("x".into()).status().as_u16(), 400);
        assert_eq!(ProxyError::Forbidden.status().as_u16(), 403);
        assert_eq!(ProxyError::Timeout.status().as_u16(), 504);
        assert_eq!(ProxyError::Upstream("HTTP 404".into()).status().as_u16(), 500);
    }
}

// ── From conversions ────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::FileIO(ref m) if m.contains("denied")));
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[tokio::test]
    async fn from_reqwest_error_drops_request_url() {
        let reqwest_err = reqwest::Client::new()
            .get("http://127.0.0.1:1/api/search/recent?query=secret-term")
            .send()
            .await
            .unwrap_err();
        let err: CoreError = reqwest_err.into();

        assert!(matches!(err, CoreError::Network(_)));
        let msg = err.to_string();
        assert!(!msg.contains("127.0.0.1"), "{msg}");
        assert!(!msg.contains("secret-term"), "{msg}");
    }

    #[test]
    fn question_marks_in_other_messages_survive() {
        let err = CoreError::UpstreamUnavailable {
            provider: "Threads API".into(),
            message: "HTTP 500 for query \"why?\"".into(),
        };
        assert!(err.to_string().ends_with("\"why?\""));
    }
}
