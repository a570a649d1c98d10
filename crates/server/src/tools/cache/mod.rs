//! Cache-related MCP tools.
//!
//! This module provides read-only views of the worker's response stores.

pub mod lookup;
pub mod stores;

pub use lookup::{CacheMatchParams, match_impl};
pub use stores::{CacheStoresParams, stores_impl};
