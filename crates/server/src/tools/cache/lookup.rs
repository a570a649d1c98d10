//! cache_match tool implementation.
//!
//! Looks up the cached GET response for a path in the current store.

use fireguide_client::fetch::resolve;
use fireguide_core::{CacheDb, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::tools::json_result;

/// Parameters for the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchParams {
    /// Root-relative path of the resource (e.g. "/index.html").
    pub path: String,
}

/// Output from the cache_match tool. The body itself is not returned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub url: String,
    pub status_code: u16,
    pub response_type: String,
    pub content_type: Option<String>,
    /// Body size in bytes.
    pub size: usize,
    pub cached_at: String,
}

/// Implementation of the cache_match tool.
pub async fn match_impl(
    cache: &CacheDb, store: &str, origin: &Url, params: CacheMatchParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve(origin, params.path.trim()).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let entry = cache
        .match_entry(store, "GET", url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("GET {}", params.path)))?;

    let content_type = entry
        .headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.clone());

    let output = CacheMatchOutput {
        url: entry.url,
        status_code: entry.status_code,
        response_type: entry.response_type.to_string(),
        content_type,
        size: entry.body.len(),
        cached_at: entry.cached_at,
    };
    json_result(&output)
}
