//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{body::Bytes, http::{header, StatusCode, Uri}, Router};
use tokio::net::TcpListener;

use chat_proxy::config::ProxyConfig;
use chat_proxy::lifecycle::{self, Shutdown};

pub const TEST_API_KEY: &str = "test-secret-key";

/// A request seen by the mock upstream.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub body: serde_json::Value,
}

#[allow(dead_code)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicU32>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable upstream. `f` receives the zero-based call index and
/// returns the status and JSON body to send back.
pub async fn start_mock_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let handler_calls = calls.clone();
    let handler_requests = requests.clone();
    let app = Router::new().fallback(move |uri: Uri, body: Bytes| {
        let calls = handler_calls.clone();
        let requests = handler_requests.clone();
        let f = f.clone();
        async move {
            let index = calls.fetch_add(1, Ordering::SeqCst);
            requests.lock().unwrap().push(RecordedRequest {
                path: uri.path().to_string(),
                query: uri.query().map(str::to_string),
                body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
            });
            let (status, body) = f(index).await;
            (
                StatusCode::from_u16(status).unwrap(),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
        }
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, calls, requests }
}

/// Upstream answering every call with one fixed response.
#[allow(dead_code)]
pub async fn start_fixed_upstream(status: u16, body: &'static str) -> MockUpstream {
    start_mock_upstream(move |_| async move { (status, body.to_string()) }).await
}

/// A successful `generateContent` body.
#[allow(dead_code)]
pub fn candidate_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

/// Address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Proxy configuration pointing at `upstream`.
pub fn proxy_config(upstream: SocketAddr, allowed_origins: &[&str]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.upstream.url = format!("http://{}/v1beta/models/test-model:generateContent", upstream);
    config.upstream.api_key = Some(TEST_API_KEY.into());
    config.security.allowed_origins = allowed_origins.iter().map(|s| s.to_string()).collect();
    config.timeouts.upstream_secs = 5;
    config
}

/// A running proxy. Dropping the handle does not stop it; call `stop`.
pub struct RunningProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let (server, listener) = lifecycle::prepare(config).await.expect("proxy failed to start");
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningProxy { addr, shutdown }
}
