//! Shared application state.
//!
//! Everything here is read-only after startup except the rate-limiter map,
//! so request tasks never contend beyond that one mutex.

use std::sync::Arc;

use praxis_executor::Engine;

use crate::client::RemoteExecutor;
use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;

/// Where execution requests go: the in-process engine, or a remote execution
/// service when `EXECUTION_SERVICE_URL` is configured.
#[derive(Clone)]
pub enum Backend {
    Local(Arc<Engine>),
    Remote(Arc<RemoteExecutor>),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub backend: Backend,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, backend: Backend) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            limiter: Arc::new(RateLimiter::new()),
        }
    }
}
