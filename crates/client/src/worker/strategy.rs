//! Fetch interception: cache first, then network, then cache again.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use super::{CachingWorker, WorkerState};
use crate::fetch::{Network, Request, Response};
use fireguide_core::{Error, ResponseType};

/// Only complete, same-origin responses are stored.
fn is_cacheable(response: &Response) -> bool {
    response.status == StatusCode::OK && response.response_type == ResponseType::Basic
}

impl CachingWorker {
    /// Answer a request on behalf of the page.
    ///
    /// While active, for `GET` requests:
    /// 1. cache hit → cached response, no network
    /// 2. miss → network; a 200 `basic` response is stored before returning
    /// 3. network failure → cache again; a miss returns the network error
    ///
    /// Any other request, any request outside the worker's scope, or any
    /// request while not active, goes straight to the network.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response, Error> {
        if request.method != Method::GET || !self.in_scope(request) || self.state().await != WorkerState::Active {
            return self.network.fetch(request).await;
        }

        if let Some(hit) = self.lookup(request).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(hit);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if is_cacheable(&response) {
                    self.store(request, &response).await;
                }
                Ok(response)
            }
            Err(err) => match self.lookup(request).await {
                Some(hit) => {
                    tracing::info!(url = %request.url, error = %err, "network failed, served from cache");
                    Ok(hit)
                }
                None => {
                    tracing::warn!(url = %request.url, error = %err, "network failed, no cached copy");
                    Err(err)
                }
            },
        }
    }

    /// Exact-match lookup in the current store. Lookup errors count as misses.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        let entry = match self
            .cache
            .match_entry(&self.config.cache_name, request.method.as_str(), request.url.as_str())
            .await
        {
            Ok(entry) => entry?,
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "cache lookup failed");
                return None;
            }
        };

        match Response::from_cached(entry) {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "unreadable cache entry");
                None
            }
        }
    }

    /// Store a copy of the response. A failed write does not fail the fetch.
    async fn store(&self, request: &Request, response: &Response) {
        let entry = response.to_cached(request);
        match self.cache.put_entry(&self.config.cache_name, &entry).await {
            Ok(()) => tracing::debug!(url = %request.url, bytes = entry.body.len(), "cached response"),
            Err(err) => tracing::warn!(url = %request.url, error = %err, "failed to cache response"),
        }
    }
}

#[async_trait]
impl Network for CachingWorker {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.handle_fetch(request).await
    }
}
