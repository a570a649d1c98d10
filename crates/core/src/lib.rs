//! Core types and shared functionality for the fire operations guide.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedResponse, ResponseType, StoreSummary};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
