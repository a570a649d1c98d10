//! In-process network double for worker and viewer tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use crate::fetch::{Network, Request, Response, same_origin};
use fireguide_core::{Error, ResponseType};

pub const ORIGIN: &str = "http://127.0.0.1:8080";

pub fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub fn url(path: &str) -> Url {
    origin().join(path).unwrap()
}

/// Serves canned responses and counts every call; can be switched offline.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, (StatusCode, Bytes, &'static str)>>,
    latency: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: Url, status: u16, body: &[u8], content_type: &'static str) -> Self {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            (StatusCode::from_u16(status).unwrap(), Bytes::copy_from_slice(body), content_type),
        );
        self
    }

    pub fn ok(self, path: &str, body: &[u8]) -> Self {
        self.route(url(path), 200, body, "text/html")
    }

    /// Delay every response for `path` by `delay`.
    pub fn slow(self, path: &str, delay: Duration) -> Self {
        self.latency.lock().unwrap().insert(url(path).to_string(), delay);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.latency.lock().unwrap().get(request.url.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkFailed(format!("{}: offline", request.url)));
        }

        let (status, body, content_type) = self
            .routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, Bytes::new(), "text/plain"));

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));

        let response_type =
            if same_origin(&request.url, &origin()) { ResponseType::Basic } else { ResponseType::Cors };

        Ok(Response { url: request.url.clone(), status, response_type, headers, body })
    }
}
