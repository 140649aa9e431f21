//! Client for the ManaVault REST function and database RPCs.
//!
//! # Endpoints
//!
//! - `{api_url}{function_path}/api/...` - the REST function (catalog,
//!   collections, watchlists, stats, bulk import)
//! - `{api_url}/rest/v1/rpc/<name>` - database functions called directly
//!   (admin operations, and the search fallback)
//!
//! Every request carries the anon key as `apikey` and a bearer token. Card
//! details go through an injected [`CardCache`]. Nothing is retried; a
//! failed read of the catalog falls back once to the database.

mod admin;
mod catalog;
mod collections;
mod stats;
pub mod types;
mod watchlists;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::cache::CardCache;
use crate::config::StorefrontConfig;
use crate::error::{ApiError, Result};

pub use types::*;

/// Path of the database REST interface below the project URL.
const REST_PATH: &str = "/rest/v1";

/// Longest slice of a response body written to logs.
const MAX_LOGGED_BODY_CHARS: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the REST function.
///
/// Cheap to clone; clones share the HTTP connection pool and the card cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    function_base: String,
    rest_base: String,
    anon_key: SecretString,
    bearer_token: SecretString,
    cache: CardCache,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("function_base", &self.inner.function_base)
            .field("rest_base", &self.inner.rest_base)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, cache: CardCache) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let project = config.api_url.as_str().trim_end_matches('/');

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                function_base: format!("{project}{}", config.function_path),
                rest_base: format!("{project}{REST_PATH}"),
                anon_key: config.anon_key.clone(),
                bearer_token: config.bearer_token().clone(),
                cache,
            }),
        })
    }

    /// The card cache shared by this client.
    #[must_use]
    pub fn cache(&self) -> &CardCache {
        &self.inner.cache
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// URL of a REST function route, e.g. `/api/cards`.
    fn function_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{path}", self.inner.function_base))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// URL of a database function.
    fn rpc_url(&self, name: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/rpc/{name}", self.inner.rest_base))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.inner.bearer_token.expose_secret())
    }

    /// Send a request and decode the JSON answer.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(MAX_LOGGED_BODY_CHARS).collect::<String>(),
                "REST function returned non-success status"
            );
            return Err(ApiError::from_response(status, &body));
        }

        // DELETE handlers may answer with an empty body
        let body = if body.trim().is_empty() { "null" } else { &body };

        serde_json::from_str(body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(MAX_LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse REST function response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.function_url(path, query)?;
        debug!(%url, "GET");
        self.execute(self.request(Method::GET, url)).await
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.function_url(path, query)?;
        debug!(%url, %method, "Sending JSON");
        self.execute(self.request(method, url).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.function_url(path, query)?;
        debug!(%url, "DELETE");
        self.execute(self.request(Method::DELETE, url)).await
    }

    /// Call a database function with JSON arguments.
    async fn rpc<B, T>(&self, name: &str, params: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.rpc_url(name)?;
        debug!(rpc = name, "Calling database function");
        self.execute(self.request(Method::POST, url).json(params))
            .await
    }
}
