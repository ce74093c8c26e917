//! Failure injection for the retrying client, alone and through the proxy.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use chat_proxy::client::{endpoint_url, friendly_message, BackoffClient, ChatSession, ClientError, Role};
use chat_proxy::http::Endpoint;
use chat_proxy::resilience::{BackoffConfig, RetryPolicy};

mod common;

fn fast_client(max_retries: u32, attempt_timeout: Duration) -> BackoffClient {
    let policy = RetryPolicy {
        max_retries,
        backoff: BackoffConfig::default().with_initial_delay(Duration::from_millis(10)),
    };
    BackoffClient::with_policy(policy, attempt_timeout).unwrap()
}

#[tokio::test]
async fn test_retry_until_success() {
    let upstream = common::start_mock_upstream(|n| async move {
        if n < 2 {
            (503, r#"{"error":"busy"}"#.to_string())
        } else {
            (200, r#"{"ok":true}"#.to_string())
        }
    })
    .await;

    let client = fast_client(5, Duration::from_secs(5));
    let body = client
        .send(&upstream.url("/api/chat"), &json!({"contents": []}))
        .await
        .unwrap();

    assert_eq!(body, json!({"ok": true}));
    assert_eq!(upstream.call_count(), 3);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_status() {
    let upstream = common::start_fixed_upstream(503, r#"{}"#).await;
    let client = fast_client(5, Duration::from_secs(5));

    let err = client
        .send_with_retry(&upstream.url("/api/chat"), &json!({}), 2)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(upstream.call_count(), 3);
    assert_eq!(friendly_message(&err), "Server error. Please try again in a few moments.");
}

#[tokio::test]
async fn test_client_errors_are_retried_too() {
    let upstream = common::start_fixed_upstream(404, r#"{}"#).await;
    let client = fast_client(3, Duration::from_secs(5));

    let err = client
        .send(&upstream.url("/missing"), &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(upstream.call_count(), 4);
}

#[tokio::test]
async fn test_zero_retries_makes_one_attempt() {
    let upstream = common::start_fixed_upstream(500, r#"{}"#).await;
    let client = fast_client(5, Duration::from_secs(5));

    let err = client
        .send_with_retry(&upstream.url("/api/chat"), &json!({}), 0)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(upstream.call_count(), 1);
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let dead = common::closed_addr().await;
    let client = fast_client(1, Duration::from_secs(5));

    let err = client
        .send(&format!("http://{}/api/chat", dead), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.is_unreachable());
}

#[tokio::test]
async fn test_slow_attempt_times_out() {
    let upstream = common::start_mock_upstream(|_| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        (200, r#"{"ok":true}"#.to_string())
    })
    .await;
    let client = fast_client(1, Duration::from_millis(100));

    let err = client
        .send(&upstream.url("/api/chat"), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout(_)));
    assert_eq!(upstream.call_count(), 2);
}

#[tokio::test]
async fn test_session_through_proxy_recovers_from_upstream_failure() {
    let upstream = common::start_mock_upstream(|n| async move {
        if n == 0 {
            (503, r#"{"error":"overloaded"}"#.to_string())
        } else {
            (200, common::candidate_body("Welcome to Fusion4o!"))
        }
    })
    .await;
    let proxy = common::start_proxy(common::proxy_config(upstream.addr, &[])).await;

    let client = fast_client(3, Duration::from_secs(5));
    let url = endpoint_url(&proxy.url(""), Endpoint::Chat.path());
    let mut session = ChatSession::new("Be brief.");

    let reply = session
        .submit(&client, &url, "<script>alert(1)</script>Hello")
        .await
        .unwrap();

    assert_eq!(reply.as_deref(), Some("Welcome to Fusion4o!"));
    assert_eq!(upstream.call_count(), 2);

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].parts[0].text, "Hello");
    assert_eq!(history[1].role, Role::Model);

    let sent = &upstream.recorded()[1].body;
    assert_eq!(sent["contents"][0]["parts"][0]["text"], "Hello");
    assert_eq!(sent["systemInstruction"]["parts"][0]["text"], "Be brief.");

    proxy.stop();
}

#[tokio::test]
async fn test_session_sees_origin_rejection_as_access_denied() {
    let upstream = common::start_fixed_upstream(200, r#"{"ok":true}"#).await;
    let proxy = common::start_proxy(common::proxy_config(upstream.addr, &[])).await;

    let policy = RetryPolicy {
        max_retries: 0,
        backoff: BackoffConfig::default(),
    };
    let client = BackoffClient::with_policy(policy, Duration::from_secs(5)).unwrap();

    // The session client sends no Origin header, so forge one directly.
    let res = reqwest::Client::new()
        .post(proxy.url("/api/chat"))
        .header("Origin", "https://evil.example")
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    let err = ClientError::Status(res.status());
    assert_eq!(friendly_message(&err), "Access denied. Please refresh the page and try again.");

    let mut session = ChatSession::new("Be brief.");
    let outcome = session
        .submit(&client, &endpoint_url(&proxy.url(""), "/api/chat"), "   ")
        .await
        .unwrap();
    assert!(outcome.is_none());
    assert!(session.history().is_empty());
    assert_eq!(upstream.call_count(), 0);

    proxy.stop();
}

#[tokio::test]
async fn test_failed_submit_keeps_user_turn() {
    let upstream = common::start_fixed_upstream(500, r#"{}"#).await;
    let client = fast_client(1, Duration::from_secs(5));
    let mut session = ChatSession::new("Be brief.");

    let err = session
        .submit(&client, &upstream.url("/api/chat"), "Hello")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].role, Role::User);
    assert_eq!(upstream.call_count(), 2);
}
