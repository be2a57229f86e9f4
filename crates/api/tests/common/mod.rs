#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderName, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use zest_api::config::{ServerConfig, StoreBackend};
use zest_api::rate_limiter::RateLimiter;
use zest_api::router::build_app_router;
use zest_api::state::AppState;
use zest_core::rate_limit::RateLimitPolicy;
use zest_mail::{EmailMessage, MailError, Mailer, SentEmail};
use zest_store::{CounterStore, MemoryStore};

pub const FEEDBACK_URI: &str = "/api/v1/feedback";

/// Build a test `ServerConfig` with the reference limits (1 per 60 s, 60 s block).
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        client_ip_header: HeaderName::from_static("cf-connecting-ip"),
        rate_limit: RateLimitPolicy::default(),
        store: StoreBackend::Memory,
    }
}

// ---------------------------------------------------------------------------
// Fake mailer
// ---------------------------------------------------------------------------

/// Mailer that records every message instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail_with_status: Option<u16>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose provider always answers with `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<SentEmail, MailError> {
        self.sent.lock().unwrap().push(message.clone());
        match self.fail_with_status {
            Some(status) => Err(MailError::Provider {
                status,
                body: r#"{"message":"API key is invalid","name":"validation_error"}"#.into(),
            }),
            None => Ok(SentEmail {
                id: Some("em_test".into()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Handles a test keeps to inspect side effects.
pub struct TestApp {
    pub router: Router,
    pub mailer: RecordingMailer,
    pub store: Option<Arc<MemoryStore>>,
}

impl TestApp {
    /// App with an in-memory counter store and a recording mailer.
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::new())
    }

    pub fn with_mailer(mailer: RecordingMailer) -> Self {
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(store.clone() as Arc<dyn CounterStore>, RateLimitPolicy::default());
        Self::build(limiter, mailer, Some(store))
    }

    /// App with no counter store: rate limiting fails open.
    pub fn without_store() -> Self {
        let limiter = RateLimiter::disabled(RateLimitPolicy::default());
        Self::build(limiter, RecordingMailer::new(), None)
    }

    /// App with a caller-supplied limiter.
    pub fn with_limiter(limiter: RateLimiter) -> Self {
        Self::build(limiter, RecordingMailer::new(), None)
    }

    fn build(limiter: RateLimiter, mailer: RecordingMailer, store: Option<Arc<MemoryStore>>) -> Self {
        let config = test_config();
        let state = AppState {
            config: Arc::new(config.clone()),
            rate_limiter: limiter,
            mailer: Arc::new(mailer.clone()),
        };
        Self {
            router: build_app_router(state, &config),
            mailer,
            store,
        }
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send `request` through a clone of `app`.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a raw body to the feedback endpoint, optionally with a client IP.
pub async fn post_raw(app: &Router, ip: Option<&str>, body: impl Into<Body>) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(FEEDBACK_URI)
        .header("content-type", "application/json");
    if let Some(ip) = ip {
        builder = builder.header("cf-connecting-ip", ip);
    }
    send(app, builder.body(body.into()).unwrap()).await
}

/// POST a JSON payload to the feedback endpoint from `ip`.
pub async fn post_feedback(app: &Router, ip: &str, payload: serde_json::Value) -> Response {
    post_raw(app, Some(ip), payload.to_string()).await
}

/// Send a request with an arbitrary method to the feedback endpoint.
pub async fn request_with_method(app: &Router, method: Method, ip: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(FEEDBACK_URI)
        .header("cf-connecting-ip", ip)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

/// The reference scenario payload.
pub fn docker_payload() -> serde_json::Value {
    serde_json::json!({
        "prompt": "list docker images",
        "failedOutput": "docker list images",
        "modelVersion": "Zest Lite",
    })
}
