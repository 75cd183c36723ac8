//! Strata HTTP API
//!
//! JSON-over-HTTP face of the version control engine. Requests are routed
//! by method and path, handlers speak the `{success, message, ...}`
//! envelope, and all repository state lives behind a single RwLock.

pub mod handlers;
pub mod store;

pub use store::{StateStore, StoreError};

use std::path::PathBuf;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response};
use tokio::sync::RwLock;

use strata_core::RepositoryRegistry;

/// Name of the repository seeded into an empty registry.
pub const DEFAULT_REPOSITORY: &str = "default";

/// API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON state file path; `None` keeps all state in memory
    pub state_path: Option<PathBuf>,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: None,
            max_body_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

/// Shared request handler for the JSON API.
///
/// Cheap to clone; clones share the same registry and state store.
#[derive(Clone)]
pub struct ApiHandler {
    registry: Arc<RwLock<RepositoryRegistry>>,
    store: Option<StateStore>,
    config: Config,
}

impl ApiHandler {
    /// Create a handler with in-memory state only.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(seeded(RepositoryRegistry::new()))),
            store: None,
            config: Config::default(),
        }
    }

    /// Create a handler, loading persisted state when `state_path` is set.
    pub fn with_config(config: Config) -> Result<Self, ApiError> {
        let (registry, store) = match &config.state_path {
            Some(path) => {
                let store = StateStore::new(path);
                let registry = store.load()?;
                (registry, Some(store))
            }
            None => (RepositoryRegistry::new(), None),
        };
        Ok(Self {
            registry: Arc::new(RwLock::new(seeded(registry))),
            store,
            config,
        })
    }

    /// Handle an incoming HTTP request.
    pub async fn handle(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, ApiError> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        tracing::debug!("API request: {} {}", method, path);

        let body = req
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Body(e.to_string()))?
            .to_bytes();

        if body.len() > self.config.max_body_size {
            return handlers::payload_too_large();
        }

        let response = self.route(&method, &path, &body).await?;

        if response.status().is_success() && is_mutation(&method, &path) {
            self.persist().await;
        }

        Ok(response)
    }

    async fn route(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> Result<Response<Full<Bytes>>, ApiError> {
        match (method.as_str(), path) {
            ("GET", "/health") => handlers::handle_health(),

            // Repository management
            ("POST", "/api/repos") => {
                handlers::handle_repo_create(body, &mut *self.registry.write().await)
            }
            ("GET", "/api/repos") => handlers::handle_repo_list(&*self.registry.read().await),
            ("POST", "/api/repos/switch") => {
                handlers::handle_repo_switch(body, &mut *self.registry.write().await)
            }
            ("DELETE", _) if path.starts_with("/api/repos/") => {
                let name = &path["/api/repos/".len()..];
                handlers::handle_repo_delete(name, &mut *self.registry.write().await)
            }

            // Operations against the active repository
            ("POST", "/api/init") => handlers::handle_init(&mut *self.registry.write().await),
            ("POST", "/api/add") => {
                handlers::handle_add(body, &mut *self.registry.write().await)
            }
            ("POST", "/api/commit") => {
                handlers::handle_commit(body, &mut *self.registry.write().await)
            }
            ("GET", "/api/log") => handlers::handle_log(&*self.registry.read().await),
            ("GET", "/api/status") => handlers::handle_status(&*self.registry.read().await),
            ("POST", "/api/diff") => handlers::handle_diff(body, &*self.registry.read().await),
            ("POST", "/api/branch") => {
                handlers::handle_branch_create(body, &mut *self.registry.write().await)
            }
            ("GET", "/api/branches") => {
                handlers::handle_branches(&*self.registry.read().await)
            }
            ("DELETE", _) if path.starts_with("/api/branch/") => {
                let name = &path["/api/branch/".len()..];
                handlers::handle_branch_delete(name, &mut *self.registry.write().await)
            }
            ("POST", "/api/checkout") => {
                handlers::handle_checkout(body, &mut *self.registry.write().await)
            }
            ("POST", "/api/merge") => {
                handlers::handle_merge(body, &mut *self.registry.write().await)
            }
            ("POST", "/api/undo") => handlers::handle_undo(&mut *self.registry.write().await),
            ("POST", "/api/redo") => handlers::handle_redo(&mut *self.registry.write().await),
            ("POST", "/api/revert") => {
                handlers::handle_revert(body, &mut *self.registry.write().await)
            }
            ("POST", "/api/reset") => handlers::handle_reset(&mut *self.registry.write().await),

            _ => handlers::handle_not_found(),
        }
    }

    async fn persist(&self) {
        if let Some(store) = &self.store {
            let registry = self.registry.read().await;
            if let Err(err) = store.save(&registry) {
                tracing::warn!("Failed to save state: {}", err);
            }
        }
    }
}

impl Default for ApiHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// An empty registry gets one repository so single-repository clients can
/// start with `init` straight away.
fn seeded(mut registry: RepositoryRegistry) -> RepositoryRegistry {
    if registry.is_empty() {
        let _ = registry.create(DEFAULT_REPOSITORY);
    }
    registry
}

/// Successful requests through these methods change state and trigger a
/// save; `/api/diff` is POST only because it carries a body.
fn is_mutation(method: &Method, path: &str) -> bool {
    matches!(*method, Method::POST | Method::DELETE) && path != "/api/diff"
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to read request body: {0}")]
    Body(String),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),
}
