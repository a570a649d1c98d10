//! cache_stores tool implementation.
//!
//! Lists every response store with its entry count.

use fireguide_core::{CacheDb, StoreSummary};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_stores tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresParams {}

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Name of the store the active worker reads and writes.
    pub current: String,
    pub stores: Vec<StoreSummary>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(
    cache: &CacheDb, current: &str, _params: CacheStoresParams,
) -> Result<CallToolResult, McpError> {
    let stores = cache.store_summaries(current).await?;
    json_result(&CacheStoresOutput { current: current.to_string(), stores })
}
