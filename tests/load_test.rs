//! Concurrent load through the proxy.

use std::time::{Duration, Instant};

use serde_json::json;

use chat_proxy::client::{endpoint_url, BackoffClient, ChatSession};
use chat_proxy::http::Endpoint;
use chat_proxy::resilience::{BackoffConfig, RetryPolicy};

mod common;

#[tokio::test]
async fn test_concurrent_sessions() {
    let upstream = common::start_mock_upstream(|_| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        (200, common::candidate_body("pong"))
    })
    .await;
    let proxy = common::start_proxy(common::proxy_config(upstream.addr, &[])).await;

    let policy = RetryPolicy {
        max_retries: 2,
        backoff: BackoffConfig::default().with_initial_delay(Duration::from_millis(10)),
    };
    let client = BackoffClient::with_policy(policy, Duration::from_secs(5)).unwrap();
    let url = endpoint_url(&proxy.url(""), Endpoint::Chat.path());

    let concurrency = 20;
    let turns_per_session = 5;
    let start = Instant::now();

    let mut tasks = Vec::new();
    for i in 0..concurrency {
        let client = client.clone();
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            let mut session = ChatSession::new("Be brief.");
            let mut latencies = Vec::new();
            for turn in 0..turns_per_session {
                let sent = Instant::now();
                let reply = session
                    .submit(&client, &url, &format!("session {i} turn {turn}"))
                    .await
                    .unwrap();
                assert_eq!(reply.as_deref(), Some("pong"));
                latencies.push(sent.elapsed());
            }
            (session.history().len(), latencies)
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        let (history_len, latencies) = task.await.unwrap();
        assert_eq!(history_len, turns_per_session * 2);
        all_latencies.extend(latencies);
    }

    let elapsed = start.elapsed();
    let total = concurrency * turns_per_session;
    assert_eq!(upstream.call_count() as usize, total);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[all_latencies.len() * 99 / 100];
    println!("{total} requests in {elapsed:?} (p50 {p50:?}, p99 {p99:?})");

    // The last request of each session carries the whole conversation.
    let recorded = upstream.recorded();
    let longest = recorded
        .iter()
        .map(|r| r.body["contents"].as_array().map_or(0, |c| c.len()))
        .max()
        .unwrap();
    assert_eq!(longest, turns_per_session * 2 - 1);

    proxy.stop();
}

#[tokio::test]
async fn test_mixed_endpoints_under_load() {
    let upstream = common::start_fixed_upstream(200, r#"{"ok":true}"#).await;
    let proxy = common::start_proxy(common::proxy_config(upstream.addr, &[])).await;
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for i in 0..30 {
        let client = client.clone();
        let endpoint = Endpoint::ALL[i % 3];
        let url = proxy.url(endpoint.path());
        let origin = if i % 2 == 0 { "http://localhost:3000" } else { "https://evil.example" };
        tasks.push(tokio::spawn(async move {
            let res = client
                .post(url)
                .header("Origin", origin)
                .json(&json!({"contents": []}))
                .send()
                .await
                .unwrap();
            (origin, res.status().as_u16())
        }));
    }

    for task in tasks {
        let (origin, status) = task.await.unwrap();
        let expected = if origin.starts_with("http://localhost") { 200 } else { 403 };
        assert_eq!(status, expected);
    }
    assert_eq!(upstream.call_count(), 15);

    proxy.stop();
}
