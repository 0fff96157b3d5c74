//! GitHub API client.

use std::sync::Arc;

use octocrab::Octocrab;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;

use crate::error::{ForkPrError, Result};
use crate::github::Lookup;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Client for interacting with the GitHub API.
///
/// Git data, repository and user calls go through a blocking `reqwest`
/// client. Pull request calls go through `octocrab`, driven on a private
/// current-thread runtime so callers stay synchronous.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) token: String,
    pub(crate) base_url: String,
    pub(crate) client: Client,
    pub(crate) octocrab: Octocrab,
    runtime: Arc<Runtime>,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_enterprise(token, DEFAULT_API_URL)
    }

    /// Create a client for GitHub Enterprise with a custom base URL.
    pub fn with_enterprise(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let mut url = base_url.into();
        if url.ends_with('/') {
            url.pop();
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let octocrab = {
            let _guard = runtime.enter();
            Octocrab::builder()
                .base_uri(url.as_str())
                .and_then(|builder| builder.personal_token(token.clone()).build())
        }
        .map_err(|e| ForkPrError::GitHub {
            message: format!("Failed to build API client for {}: {}", url, e),
        })?;

        Ok(Self {
            token,
            base_url: url,
            client: Client::new(),
            octocrab,
            runtime: Arc::new(runtime),
        })
    }

    /// Create a client using the GITHUB_TOKEN environment variable.
    pub fn from_env() -> Result<Self> {
        Self::new(token_from_env()?)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run an octocrab future to completion on the client's runtime.
    pub(crate) fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Get the default headers for API requests.
    pub(crate) fn headers(&self, accept: &'static str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            ForkPrError::InvalidConfig(format!("{} contains invalid header characters", TOKEN_ENV))
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(USER_AGENT, HeaderValue::from_static("fork-pr"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        accept: &'static str,
    ) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::trace!(%method, %url, "GitHub request");
        Ok(self.client.request(method, &url).headers(self.headers(accept)?))
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }

        response.json().map_err(|e| ForkPrError::GitHub {
            message: format!("Failed to parse response: {}", e),
        })
    }

    /// Make a GET request to the GitHub API.
    pub(crate) fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send(self.request(reqwest::Method::GET, endpoint, JSON_MEDIA_TYPE)?)
    }

    /// Make a POST request to the GitHub API.
    pub(crate) fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.send(
            self.request(reqwest::Method::POST, endpoint, JSON_MEDIA_TYPE)?
                .json(body),
        )
    }

    /// Make a PATCH request to the GitHub API.
    pub(crate) fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        self.send(
            self.request(reqwest::Method::PATCH, endpoint, JSON_MEDIA_TYPE)?
                .json(body),
        )
    }

    /// GET a JSON resource, mapping 404 to `Lookup::NotFound`.
    pub(crate) fn lookup<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Lookup<T>> {
        match self.get(endpoint) {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(ForkPrError::Api { status: 404, .. }) => Ok(Lookup::NotFound),
            Err(e) => Err(e),
        }
    }

    /// GET a resource as raw bytes, mapping 404 to `Lookup::NotFound`.
    pub(crate) fn lookup_raw(&self, endpoint: &str) -> Result<Lookup<Vec<u8>>> {
        let response = self
            .request(reqwest::Method::GET, endpoint, RAW_MEDIA_TYPE)?
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Lookup::NotFound);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(Lookup::Found(response.bytes()?.to_vec()))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Read the API token from `GITHUB_TOKEN`.
pub fn token_from_env() -> Result<String> {
    parse_token(std::env::var(TOKEN_ENV).ok())
}

/// Trim a raw token value, rejecting a missing or blank one.
pub(crate) fn parse_token(raw: Option<String>) -> Result<String> {
    match raw.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(ForkPrError::MissingToken {
            var: TOKEN_ENV.to_string(),
        }),
    }
}

/// Build an API error, preferring the `message` field of a JSON error body.
pub(crate) fn api_error(status: StatusCode, body: &str) -> ForkPrError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string());

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        message
    };

    ForkPrError::Api {
        status: status.as_u16(),
        message,
    }
}
