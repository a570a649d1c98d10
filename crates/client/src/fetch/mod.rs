//! HTTP fetch pipeline shared by the caching worker and the view controller.
//!
//! ### Requests
//! - Paths are resolved against the guide origin, fragments removed
//! - Query strings are kept; they are part of the request identity
//!
//! ### Responses
//! - Non-success statuses are responses, not errors
//! - Responses from the guide origin are `basic`, all others `cors`
//! - Max redirects: 5
//! - Max body bytes: 20MB (configurable)
//!
//! ### Failures
//! - Connection errors map to `NETWORK_FAILED`, timeouts to `FETCH_TIMEOUT`

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve, same_origin};

use fireguide_core::{AppConfig, CachedResponse, Error, ResponseType};
use ::url::Url;

/// A request as seen by the fetch path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    /// A `GET` request for the given URL.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }
}

/// Response from a fetch, either from the network or rebuilt from cache.
#[derive(Debug, Clone)]
pub struct Response {
    /// The final URL after redirects
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Relationship to the guide origin
    pub response_type: ResponseType,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body bytes
    pub body: Bytes,
}

impl Response {
    /// Content-Type header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Capture this response for storage under `request`.
    ///
    /// The body is copied; the response itself stays readable.
    pub fn to_cached(&self, request: &Request) -> CachedResponse {
        CachedResponse {
            method: request.method.as_str().to_string(),
            url: request.url.to_string(),
            status_code: self.status.as_u16(),
            status_text: self.status.canonical_reason().map(str::to_string),
            response_type: self.response_type,
            headers: self
                .headers
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
                .collect(),
            body: self.body.to_vec(),
            cached_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Rebuild a response from a cached entry.
    pub fn from_cached(entry: CachedResponse) -> Result<Self, Error> {
        let url = Url::parse(&entry.url).map_err(|e| Error::CorruptEntry(format!("{}: {e}", entry.url)))?;
        let status = StatusCode::from_u16(entry.status_code)
            .map_err(|e| Error::CorruptEntry(format!("{}: {e}", entry.url)))?;

        let mut headers = HeaderMap::with_capacity(entry.headers.len());
        for (name, value) in &entry.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            headers.append(name, value);
        }

        Ok(Self { url, status, response_type: entry.response_type, headers, body: Bytes::from(entry.body) })
    }
}

/// Something that can turn a request into a response.
///
/// Implemented by the raw HTTP client and by the caching worker, so callers
/// cannot tell whether a response came from the cache.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "fire-guide/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 20MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "fire-guide/0.1".to_string(),
            max_bytes: 20 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    /// Fetch settings taken from the application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

fn classify(err: reqwest::Error, url: &Url) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::NetworkFailed(format!("{url}: {err}"))
    }
}

/// HTTP fetch client bound to the guide origin.
pub struct FetchClient {
    http: Client,
    origin: Url,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(origin: Url, config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::NetworkFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, origin, config })
    }
}

#[async_trait]
impl Network for FetchClient {
    /// Fetch a request, returning the body and metadata whatever the status.
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(|e| classify(e, &request.url))?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                len, self.config.max_bytes
            )));
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = response.bytes().await.map_err(|e| classify(e, &request.url))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                body.len(),
                self.config.max_bytes
            )));
        }

        let response_type =
            if same_origin(&final_url, &self.origin) { ResponseType::Basic } else { ResponseType::Cors };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            final_url = %final_url,
            status = status.as_u16(),
            response_type = %response_type,
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "network fetch"
        );

        Ok(Response { url: final_url, status, response_type, headers, body })
    }
}
