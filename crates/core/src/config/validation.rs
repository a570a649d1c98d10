//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `cache_name` or `user_agent` is empty
    /// - a manifest entry or `worker_path` is not root-relative
    /// - `home_page` is not one of `pages`
    /// - `max_bytes` is 0 or exceeds 100MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin_url()?;

        if self.cache_name.trim().is_empty() {
            return Err(invalid("cache_name", "must not be empty"));
        }

        if let Some(bad) = self.asset_manifest.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("asset_manifest", format!("'{bad}' must start with '/'")));
        }

        if !self.worker_path.starts_with('/') || self.worker_path.len() < 2 {
            return Err(invalid("worker_path", "must be a root-relative script path"));
        }

        if self.pages.is_empty() {
            return Err(ConfigError::Missing { field: "pages".into(), hint: "Set at least one page id".into() });
        }
        if !self.pages.contains(&self.home_page) {
            return Err(invalid("home_page", format!("'{}' is not listed in pages", self.home_page)));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 100 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 100MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.asset_manifest.is_empty() {
            tracing::warn!(cache_name = %self.cache_name, "asset_manifest is empty; nothing is precached on install");
        }

        Ok(())
    }
}
