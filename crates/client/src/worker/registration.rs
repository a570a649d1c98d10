//! Worker registration from the page side.
//!
//! Registration runs the worker through install and activate. The page only
//! learns whether it succeeded; a failure is logged and the page carries on
//! against the raw network.

use std::sync::Arc;

use super::CachingWorker;
use crate::fetch::Network;
use fireguide_core::Error;

/// An active worker and the scope it controls.
pub struct Registration {
    /// Directory of the worker path; only requests under it are intercepted.
    pub scope: String,
    pub worker: Arc<CachingWorker>,
}

fn scope_of(worker_path: &str) -> Result<String, Error> {
    if !worker_path.starts_with('/') || worker_path.ends_with('/') {
        return Err(Error::RegistrationFailed(format!("'{worker_path}' is not a root-relative script path")));
    }
    let dir_end = worker_path.rfind('/').map(|i| i + 1).unwrap_or(1);
    Ok(worker_path[..dir_end].to_string())
}

/// Register the worker under `worker_path`: install, then activate.
///
/// # Errors
///
/// - `REGISTRATION_FAILED` if the path is not a root-relative script path
/// - `INSTALL_FAILED` or `CACHE_ERROR` from the lifecycle steps
pub async fn register(worker_path: &str, worker: CachingWorker) -> Result<Registration, Error> {
    let scope = scope_of(worker_path)?;

    let worker = worker.with_scope(scope.clone());
    worker.install().await?;
    worker.activate().await?;

    tracing::info!(worker_path, scope = %scope, cache_name = %worker.cache_name(), "worker registered");

    Ok(Registration { scope, worker: Arc::new(worker) })
}

/// Register the worker and hand back the fetch path the page should use.
///
/// Never fails: if registration fails the page gets the worker's own
/// network and works online-only.
pub async fn connect(worker_path: &str, worker: CachingWorker) -> Arc<dyn Network> {
    let network = worker.network();
    match register(worker_path, worker).await {
        Ok(registration) => registration.worker as Arc<dyn Network>,
        Err(err) => {
            tracing::warn!(worker_path, error = %err, "worker registration failed, continuing online-only");
            network
        }
    }
}
