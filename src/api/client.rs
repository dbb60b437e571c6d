use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, FROM};
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::util::{validate_base_url, UrlValidationError};

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Errors from talking to the blog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    /// Non-2xx response
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Server kept answering 429 Too Many Requests
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Body was not the JSON shape we expected
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Failed to encode request body: {0}")]
    Encode(String),
    #[error("Invalid API base URL: {0}")]
    BaseUrl(#[from] UrlValidationError),
    #[error("Invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),
}

impl ApiError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout | ApiError::Network(_) => true,
            ApiError::HttpStatus(status) => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Failures where the server cannot have acted on the request.
    fn is_rejected_before_processing(&self) -> bool {
        matches!(self, ApiError::HttpStatus(429) | ApiError::HttpStatus(503))
    }
}

/// Thin async client for the blog's admin REST API.
///
/// Endpoint groups live in sibling modules as further `impl ApiClient` blocks.
/// This file holds the transport: URL building, auth headers, timeouts,
/// bounded retries and size-limited body reads.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    authorization: Option<HeaderValue>,
    from: Option<HeaderValue>,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Base URL, credentials, timeout and retry settings
    ///
    /// # Errors
    ///
    /// - `ApiError::BaseUrl` if `api_base_url` is malformed, not http(s), or
    ///   plain http to a non-loopback host
    /// - `ApiError::InvalidHeader` if the token or username cannot be sent
    ///   as a header value
    /// - `ApiError::Network` if the HTTP client cannot be initialized
    ///
    /// # Examples
    ///
    /// ```
    /// use blogdesk::api::ApiClient;
    /// use blogdesk::config::Config;
    ///
    /// let config = Config {
    ///     api_base_url: "https://blog.example.com/api".to_string(),
    ///     ..Config::default()
    /// };
    /// let client = ApiClient::new(&config).unwrap();
    /// assert_eq!(client.base_url().as_str(), "https://blog.example.com/api/");
    /// ```
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url = validate_base_url(&config.api_base_url)?;

        let authorization = match &config.api_token {
            Some(token) => {
                let mut value = HeaderValue::from_bytes(token.expose_secret().as_bytes())
                    .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };

        // Usernames may be non-ASCII; from_bytes admits obs-text
        let from = match &config.username {
            Some(name) => Some(
                HeaderValue::from_bytes(name.as_bytes())
                    .map_err(|_| ApiError::InvalidHeader("From"))?,
            ),
            None => None,
        };

        let http = reqwest::Client::builder()
            .user_agent(concat!("blogdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(
            base_url = %base_url,
            authenticated = authorization.is_some(),
            "API client configured"
        );

        Ok(Self {
            http,
            base_url,
            authorization,
            from,
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// The validated base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path relative to the base URL and append query pairs.
    pub(crate) fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        let bytes = self
            .execute(&Method::GET, || self.http.get(url.clone()))
            .await?;
        decode(&bytes)
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, query)?;
        let payload = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        let bytes = self
            .execute(&method, || {
                self.http
                    .request(method.clone(), url.clone())
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload.clone())
            })
            .await?;
        decode(&bytes)
    }

    /// DELETE returning the raw body; callers decide whether it carries data.
    pub(crate) async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(path, query)?;
        self.execute(&Method::DELETE, || self.http.delete(url.clone()))
            .await
    }

    pub(crate) async fn post_multipart<T, F>(&self, path: &str, form: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> reqwest::multipart::Form,
    {
        let url = self.endpoint(path, &[])?;
        let bytes = self
            .execute(&Method::POST, || self.http.post(url.clone()).multipart(form()))
            .await?;
        decode(&bytes)
    }

    /// Run a request with retries.
    ///
    /// `build` is called once per attempt since request builders are consumed
    /// on send. Idempotent methods retry on any transient error. POST only
    /// retries when the server refused the request outright (429/503), so a
    /// create is never sent twice after the server may have acted on it.
    /// Backoff doubles from `retry_base_delay`.
    async fn execute<F>(&self, method: &Method, build: F) -> Result<Vec<u8>, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let idempotent = *method != Method::POST && *method != Method::PATCH;
        let mut retry_count = 0;

        loop {
            match self.attempt(build()).await {
                Ok(bytes) => return Ok(bytes),
                Err(e)
                    if retry_count < self.max_retries
                        && e.is_retryable()
                        && (idempotent || e.is_rejected_before_processing()) =>
                {
                    let delay = backoff_delay(self.retry_base_delay, retry_count);
                    tracing::warn!(
                        method = %method,
                        error = %e,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Transient API error, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(ApiError::HttpStatus(429)) if retry_count > 0 => {
                    return Err(ApiError::RateLimited(retry_count));
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let mut request = request;
        if let Some(value) = &self.authorization {
            request = request.header(AUTHORIZATION, value.clone());
        }
        if let Some(value) = &self.from {
            request = request.header(FROM, value.clone());
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| ApiError::Timeout)?
            .map_err(ApiError::Network)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %response.url(), "API returned error status");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, MAX_RESPONSE_SIZE).await
    }
}

/// `base * 2^retry`, capped at [`MAX_RETRY_DELAY`].
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(retry))
        .map_or(MAX_RETRY_DELAY, |d| d.min(MAX_RETRY_DELAY))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
