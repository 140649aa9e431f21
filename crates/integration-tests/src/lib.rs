//! Integration tests for ManaVault.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p manavault-integration-tests
//! ```
//!
//! # Test Harness
//!
//! [`FakeApi`] is an in-process `axum` server standing in for the project:
//! the REST function under [`FUNCTION_PATH`] and database functions under
//! `/rest/v1/rpc/`. Tests queue canned replies per route, drive the real
//! [`ApiClient`] against it over HTTP, then inspect the recorded requests.
//!
//! # Test Categories
//!
//! - `api_client` - Request shape, error contract, fallback, caching
//! - `bulk_import` - Chunking, pacing, failed-row offsets, abort and resume
//! - `card_detail` - Finish selection across navigation

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use manavault_storefront::{ApiClient, CachePolicy, CardCache, StorefrontConfig};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Path of the REST function below the project URL.
pub const FUNCTION_PATH: &str = "/functions/v1/api";

/// Anon key accepted by the config validation.
pub const ANON_KEY: &str = "eyJhbGciOiJIUzI1NiJ9.aB3xY9mK2nL5pQ7rT0uW4zC6.Zq8Vd1Fh";

/// Path of a REST function route, e.g. `function_route("/api/cards")`.
#[must_use]
pub fn function_route(path: &str) -> String {
    format!("{FUNCTION_PATH}{path}")
}

/// Path of a database function.
#[must_use]
pub fn rpc_route(name: &str) -> String {
    format!("/rest/v1/rpc/{name}")
}

// =============================================================================
// Replies
// =============================================================================

#[derive(Debug, Clone)]
enum ReplyBody {
    Json(Value),
    Text(String),
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: ReplyBody,
    retry_after: Option<u64>,
    delay: Duration,
}

impl Reply {
    /// 200 with a JSON body.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// Any status with a JSON body.
    #[must_use]
    pub const fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(body),
            retry_after: None,
            delay: Duration::ZERO,
        }
    }

    /// The REST function's error shape: `{ "error": message }`.
    #[must_use]
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    /// A plain-text body, as sent by proxies in front of the function.
    #[must_use]
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: ReplyBody::Text(body.to_owned()),
            retry_after: None,
            delay: Duration::ZERO,
        }
    }

    /// 429 with a `Retry-After` header.
    #[must_use]
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self {
            retry_after: Some(retry_after_secs),
            ..Self::error(StatusCode::TOO_MANY_REQUESTS, "Too many requests")
        }
    }

    /// Wait before answering.
    #[must_use]
    pub const fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

// =============================================================================
// Recorded requests
// =============================================================================

/// A request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub apikey: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
    pub received_at: Instant,
}

impl RecordedRequest {
    /// Value of a query parameter. Only `+` is decoded, which covers the
    /// values used in these tests.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| v.replace('+', " "))
        })
    }
}

// =============================================================================
// FakeApi
// =============================================================================

#[derive(Default)]
struct FakeState {
    /// Replies per path. The last reply of a queue is repeated.
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeState {
    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// In-process stand-in for the project's HTTP surface.
pub struct FakeApi {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Start a server on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read fake API address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Project URL to put in `MANAVAULT_API_URL`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue a reply for an exact path.
    pub fn on(&self, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_owned())
            .or_default()
            .push_back(reply);
    }

    /// Drop every queued reply for a path.
    pub fn clear_replies(&self, path: &str) {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }

    /// Queue a reply for a REST function route.
    pub fn on_function(&self, path: &str, reply: Reply) {
        self.on(&function_route(path), reply);
    }

    /// Queue a reply for a database function.
    pub fn on_rpc(&self, name: &str, reply: Reply) {
        self.on(&rpc_route(name), reply);
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for one path.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Configuration pointing at this server, plus extra variables.
    ///
    /// # Panics
    ///
    /// Panics if the variables do not form a valid configuration.
    #[must_use]
    pub fn config_with(&self, extra: &[(&str, &str)]) -> StorefrontConfig {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("MANAVAULT_API_URL".to_owned(), self.url()),
            ("MANAVAULT_ANON_KEY".to_owned(), ANON_KEY.to_owned()),
            ("MANAVAULT_HTTP_TIMEOUT_SECS".to_owned(), "5".to_owned()),
        ]);
        for (key, value) in extra {
            vars.insert((*key).to_owned(), (*value).to_owned());
        }
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("Fake API config should be valid")
    }

    /// Default configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        self.config_with(&[])
    }

    /// Client with an unbounded card cache.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config(), CardCache::new(CachePolicy::Unbounded))
            .expect("Failed to build API client")
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    let path = uri.path().to_owned();
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method,
            path: path.clone(),
            query: uri.query().map(str::to_owned),
            apikey: header("apikey"),
            authorization: header("authorization"),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
            received_at: Instant::now(),
        });

    let Some(reply) = state.next_reply(&path) else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": format!("No route for {path}") })),
        )
            .into_response();
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let mut response = match reply.body {
        ReplyBody::Json(value) => (reply.status, axum::Json(value)).into_response(),
        ReplyBody::Text(text) => (reply.status, text).into_response(),
    };
    if let Some(secs) = reply.retry_after {
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from(secs));
    }
    response
}
