//! Shared fixtures for unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Query;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::Config;
use crate::llm_client::{LlmError, TextGenerator, DEFAULT_API_URL};
use crate::state::AppState;
use crate::store::memory::MemoryStore;

enum Reply {
    Text(String),
    Status(u16),
    Malformed,
}

/// `TextGenerator` that answers every prompt the same way and counts calls.
pub struct StubGenerator {
    reply: Reply,
    calls: AtomicUsize,
    last_key: Mutex<Option<String>>,
}

impl StubGenerator {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_key: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Reply::Text(text.to_string()))
    }

    pub fn failing_with_status(status: u16) -> Self {
        Self::with(Reply::Status(status))
    }

    /// Behaves like a provider envelope without candidate text.
    pub fn malformed() -> Self {
        Self::with(Reply::Malformed)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_key(&self) -> Option<String> {
        self.last_key.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str, api_key: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(api_key.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Status(status) => Err(LlmError::Api {
                status: *status,
                message: "stubbed failure".into(),
            }),
            Reply::Malformed => Err(LlmError::MalformedResponse),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        port: 0,
        rust_log: "debug".into(),
        gemini_api_url: DEFAULT_API_URL.into(),
        llm_timeout_secs: 5,
        session_ttl_hours: 24,
        cookie_secure: false,
        frontend_origin: None,
    }
}

pub fn test_state(store: Arc<MemoryStore>, generator: Arc<StubGenerator>) -> AppState {
    AppState {
        store,
        generator,
        config: test_config(),
    }
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    request(Method::POST, uri, cookie, Some(body))
}

pub fn put_json(uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    request(Method::PUT, uri, cookie, Some(body))
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, cookie, None)
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::DELETE, uri, cookie, None)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the response's `Set-Cookie`, ready for a `Cookie` header.
pub fn cookie_from(response: &Response<Body>) -> String {
    let raw = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

/// Key the fake provider accepts.
pub const FAKE_PROVIDER_KEY: &str = "fake-provider-key";

/// Stand-in for the `generateContent` API.
///
/// * `/ok` answers with `reply` as candidate text when `?key=` matches
///   `FAKE_PROVIDER_KEY`, and 403 otherwise
/// * `/fail` answers 500 with a provider error body
/// * `/empty` answers 200 with no candidates
/// * `/html` answers 200 with a body that is not JSON
/// * `/slow` answers only after two seconds
pub fn fake_provider(reply: &'static str) -> Router {
    Router::new()
        .route(
            "/ok",
            post(move |Query(params): Query<HashMap<String, String>>| async move {
                if params.get("key").map(String::as_str) != Some(FAKE_PROVIDER_KEY) {
                    return (
                        StatusCode::FORBIDDEN,
                        Json(json!({"error": {"message": "API key not valid"}})),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({"candidates": [{"content": {"parts": [{"text": reply}]}}]})),
                )
            }),
        )
        .route(
            "/fail",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": {"message": "backend exploded"}})),
                )
            }),
        )
        .route("/empty", post(|| async { Json(json!({"candidates": []})) }))
        .route("/html", post(|| async { "<html>maintenance</html>" }))
        .route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"candidates": []}))
            }),
        )
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
