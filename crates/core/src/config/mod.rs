//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FIRE_GUIDE_*)
//! 2. TOML config file (if FIRE_GUIDE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FIRE_GUIDE_*)
/// 2. TOML config file (if FIRE_GUIDE_CONFIG_FILE set)
/// 3. Built-in defaults
///
/// List-valued fields accept figment array syntax from the environment,
/// e.g. `FIRE_GUIDE_PAGES='[home,guides]'`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the guide is served from. Manifest paths, document paths and
    /// the worker path are resolved against it, and only responses from it
    /// are cached.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite database holding the named cache stores.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Cache generation tag. Bumping it discards every previously cached
    /// entry on the next activation.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Root-relative paths cached at install time, in order.
    #[serde(default = "default_asset_manifest")]
    pub asset_manifest: Vec<String>,

    /// Root-relative path the caching worker is registered under.
    #[serde(default = "default_worker_path")]
    pub worker_path: String,

    /// Named pages the shell can switch between.
    #[serde(default = "default_pages")]
    pub pages: Vec<String>,

    /// Page shown at startup.
    #[serde(default = "default_home_page")]
    pub home_page: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./fire-guide-cache.sqlite")
}

fn default_cache_name() -> String {
    "fire-ops-guide-v1".into()
}

fn default_asset_manifest() -> Vec<String> {
    ["/", "/index.html", "/styles.css", "/app.js", "/manifest.json"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_worker_path() -> String {
    "/sw.js".into()
}

fn default_pages() -> Vec<String> {
    ["home", "guides", "documents"].into_iter().map(String::from).collect()
}

fn default_home_page() -> String {
    "home".into()
}

fn default_user_agent() -> String {
    "fire-guide/0.1".into()
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            asset_manifest: default_asset_manifest(),
            worker_path: default_worker_path(),
            pages: default_pages(),
            home_page: default_home_page(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let url = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid {
                field: "origin".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FIRE_GUIDE_`
    /// 2. TOML file from `FIRE_GUIDE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FIRE_GUIDE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FIRE_GUIDE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
