//! SQLite-backed named cache stores.
//!
//! This module provides the persistent request → response cache the caching
//! worker runs on, using SQLite with async access via tokio-rusqlite:
//!
//! - Stores identified by a cache generation tag
//! - Exact-request keys (SHA-256 over method and URL)
//! - Automatic schema migrations
//! - Whole-store deletion as the only eviction mechanism

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CachedResponse, ResponseType};
pub use stores::StoreSummary;
