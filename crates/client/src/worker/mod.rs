//! Offline caching worker.
//!
//! The worker sits between the view controller and the network. Its
//! lifecycle is `Installing → Waiting → Active`:
//!
//! - **install** precaches the asset manifest into the store named by the
//!   cache generation tag, all or nothing
//! - **activate** deletes every store whose name is not the current tag
//! - **fetch** (while active) serves cache-first, falls back to the
//!   network, and falls back to the cache again when the network fails
//!
//! A failed install leaves the worker `Redundant`; it never becomes active
//! with a partially populated store.

pub mod registration;
pub mod strategy;

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::fetch::{Network, Request, resolve};
use fireguide_core::{AppConfig, CacheDb, Error};

pub use registration::{Registration, connect, register};

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Precaching the asset manifest.
    Installing,
    /// Installed, not yet controlling fetches.
    Waiting,
    /// Intercepting fetches.
    Active,
    /// Install failed; the worker will never activate.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Waiting => write!(f, "waiting"),
            WorkerState::Active => write!(f, "active"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}

/// What the worker caches and under which name.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Cache generation tag; the only store that survives activation.
    pub cache_name: String,
    /// Origin the manifest paths are resolved against.
    pub origin: Url,
    /// Root-relative paths precached on install.
    pub asset_manifest: Vec<String>,
}

impl WorkerConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { cache_name: config.cache_name.clone(), origin, asset_manifest: config.asset_manifest.clone() })
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    /// Resolved URLs written to the store, in manifest order.
    pub cached: Vec<String>,
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub cache_name: String,
    /// Stale stores removed.
    pub deleted: Vec<String>,
}

/// The caching worker.
pub struct CachingWorker {
    cache: CacheDb,
    network: Arc<dyn Network>,
    config: WorkerConfig,
    /// Path prefix of the requests this worker intercepts.
    scope: String,
    state: RwLock<WorkerState>,
    /// Held for the whole of `install`; the state lock is not.
    installing: Mutex<()>,
}

impl CachingWorker {
    /// Create a worker in the `Installing` state.
    pub fn new(cache: CacheDb, network: Arc<dyn Network>, config: WorkerConfig) -> Self {
        Self {
            cache,
            network,
            config,
            scope: "/".to_string(),
            state: RwLock::new(WorkerState::Installing),
            installing: Mutex::new(()),
        }
    }

    /// Limit interception to request paths under `scope`.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Whether `request` falls under this worker's scope.
    pub fn in_scope(&self, request: &Request) -> bool {
        request.url.path().starts_with(&self.scope)
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    /// The network this worker falls through to.
    pub fn network(&self) -> Arc<dyn Network> {
        Arc::clone(&self.network)
    }

    /// Precache the asset manifest.
    ///
    /// Every manifest path must fetch with a success status before anything
    /// is written; the entries then go in as one transaction. Fetches made
    /// while this runs pass straight through to the network.
    ///
    /// # Errors
    ///
    /// - `WORKER_STATE` if the worker is not `Installing`
    /// - `INSTALL_FAILED` if any manifest path fails; the worker becomes `Redundant`
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let _installing = self.installing.lock().await;
        let state = self.state().await;
        if state != WorkerState::Installing {
            return Err(Error::InvalidState(format!("install requires installing, worker is {state}")));
        }

        let result = self.precache().await;
        let mut state = self.state.write().await;
        match result {
            Ok(cached) => {
                *state = WorkerState::Waiting;
                tracing::info!(cache_name = %self.config.cache_name, entries = cached.len(), "worker installed");
                Ok(InstallReport { cache_name: self.config.cache_name.clone(), cached })
            }
            Err(err) => {
                *state = WorkerState::Redundant;
                tracing::error!(cache_name = %self.config.cache_name, error = %err, "worker install failed");
                Err(match err {
                    Error::InstallFailed(_) => err,
                    other => Error::InstallFailed(other.to_string()),
                })
            }
        }
    }

    async fn precache(&self) -> Result<Vec<String>, Error> {
        let store = &self.config.cache_name;
        self.cache.open_store(store).await?;

        let mut entries = Vec::with_capacity(self.config.asset_manifest.len());
        for path in &self.config.asset_manifest {
            let url = resolve(&self.config.origin, path).map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;
            let request = Request::get(url);
            let response = self
                .network
                .fetch(&request)
                .await
                .map_err(|e| Error::InstallFailed(format!("{path}: {e}")))?;

            if !response.status.is_success() {
                return Err(Error::InstallFailed(format!("{path}: status {}", response.status.as_u16())));
            }

            entries.push(response.to_cached(&request));
        }

        let cached = entries.iter().map(|e| e.url.clone()).collect();
        self.cache.put_entries(store, entries).await?;
        Ok(cached)
    }

    /// Take control of fetches, deleting every stale store.
    ///
    /// # Errors
    ///
    /// - `WORKER_STATE` if the worker is not `Waiting`
    /// - `CACHE_ERROR` if the cleanup fails; the worker stays `Waiting`
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let mut state = self.state.write().await;
        if *state != WorkerState::Waiting {
            return Err(Error::InvalidState(format!("activate requires waiting, worker is {}", *state)));
        }

        let current = &self.config.cache_name;
        let mut deleted = Vec::new();
        for name in self.cache.store_names().await? {
            if &name != current && self.cache.delete_store(&name).await? {
                tracing::info!(cache_name = %name, "deleted stale cache store");
                deleted.push(name);
            }
        }

        *state = WorkerState::Active;
        tracing::info!(cache_name = %current, stale_deleted = deleted.len(), "worker activated");

        Ok(ActivationReport { cache_name: current.clone(), deleted })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{ScriptedNetwork, origin, url};

    fn config(cache_name: &str, manifest: &[&str]) -> WorkerConfig {
        WorkerConfig {
            cache_name: cache_name.to_string(),
            origin: origin(),
            asset_manifest: manifest.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn shell_network() -> Arc<ScriptedNetwork> {
        Arc::new(ScriptedNetwork::new().ok("/", b"<html>root</html>").ok("/index.html", b"<html>index</html>"))
    }

    #[test]
    fn test_worker_config_from_app() {
        let app = AppConfig::default();
        let config = WorkerConfig::from_app(&app).unwrap();
        assert_eq!(config.cache_name, "fire-ops-guide-v1");
        assert_eq!(config.asset_manifest.len(), 5);
        assert_eq!(config.origin.as_str(), "http://127.0.0.1:8080/");
    }

    #[tokio::test]
    async fn test_install_caches_every_manifest_path() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = CachingWorker::new(db.clone(), shell_network(), config("v1", &["/", "/index.html"]));

        let report = worker.install().await.unwrap();

        assert_eq!(report.cached, vec![url("/").to_string(), url("/index.html").to_string()]);
        assert_eq!(db.entry_count("v1").await.unwrap(), 2);
        for path in ["/", "/index.html"] {
            let entry = db.match_entry("v1", "GET", url(path).as_str()).await.unwrap().unwrap();
            assert_eq!(entry.status_code, 200);
        }
        assert_eq!(worker.state().await, WorkerState::Waiting);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker =
            CachingWorker::new(db.clone(), shell_network(), config("v1", &["/", "/index.html", "/missing.js"]));

        let result = worker.install().await;

        assert!(matches!(result, Err(Error::InstallFailed(msg)) if msg.contains("/missing.js")));
        assert_eq!(db.entry_count("v1").await.unwrap(), 0);
        assert_eq!(worker.state().await, WorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_install_fails_offline() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = shell_network();
        network.set_offline(true);
        let worker = CachingWorker::new(db.clone(), network, config("v1", &["/"]));

        assert!(matches!(worker.install().await, Err(Error::InstallFailed(_))));
        assert_eq!(worker.state().await, WorkerState::Redundant);
    }

    #[tokio::test]
    async fn test_redundant_worker_cannot_activate() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = CachingWorker::new(db, shell_network(), config("v1", &["/missing.js"]));
        let _ = worker.install().await;

        assert!(matches!(worker.activate().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = CachingWorker::new(db, shell_network(), config("v1", &["/"]));

        assert!(matches!(worker.activate().await, Err(Error::InvalidState(_))));
        assert_eq!(worker.state().await, WorkerState::Installing);
    }

    #[tokio::test]
    async fn test_install_twice_is_rejected() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker = CachingWorker::new(db, shell_network(), config("v1", &["/"]));
        worker.install().await.unwrap();

        assert!(matches!(worker.install().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_fetch_during_install_goes_to_network() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(
            ScriptedNetwork::new()
                .ok("/", b"<html>root</html>")
                .route(url("/doc.pdf"), 200, b"%PDF-1.4", "application/pdf")
                .slow("/", Duration::from_millis(800)),
        );
        let worker = Arc::new(CachingWorker::new(db.clone(), network, config("v1", &["/"])));

        let install = tokio::spawn({
            let worker = Arc::clone(&worker);
            async move { worker.install().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let response = tokio::time::timeout(Duration::from_millis(300), worker.fetch(&Request::get(url("/doc.pdf"))))
            .await
            .expect("fetch waited for install")
            .unwrap();
        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(worker.state().await, WorkerState::Installing);

        install.await.unwrap().unwrap();
        assert_eq!(worker.state().await, WorkerState::Waiting);
        assert_eq!(db.entry_count("v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_installs_run_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = Arc::new(ScriptedNetwork::new().ok("/", b"root").slow("/", Duration::from_millis(100)));
        let worker = CachingWorker::new(db, network.clone(), config("v1", &["/"]));

        let (first, second) = tokio::join!(worker.install(), worker.install());

        assert_ne!(first.is_ok(), second.is_ok());
        assert!(matches!(first.err().or(second.err()), Some(Error::InvalidState(_))));
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_generations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("v0").await.unwrap();

        let v1 = CachingWorker::new(db.clone(), shell_network(), config("v1", &["/", "/index.html"]));
        v1.install().await.unwrap();
        let report = v1.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["v0".to_string()]);

        let v2 = CachingWorker::new(db.clone(), shell_network(), config("v2", &["/"]));
        v2.install().await.unwrap();
        let report = v2.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["v1".to_string()]);
        assert_eq!(db.store_names().await.unwrap(), vec!["v2".to_string()]);
        assert!(db.match_entry("v1", "GET", url("/index.html").as_str()).await.unwrap().is_none());
        assert_eq!(v2.state().await, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_reactivating_same_generation_keeps_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = CachingWorker::new(db.clone(), shell_network(), config("v1", &["/"]));
        first.install().await.unwrap();
        first.activate().await.unwrap();

        let again = CachingWorker::new(db.clone(), shell_network(), config("v1", &["/", "/index.html"]));
        again.install().await.unwrap();
        let report = again.activate().await.unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(db.entry_count("v1").await.unwrap(), 2);
    }
}
