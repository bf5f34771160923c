pub mod config;
pub mod rest;
pub mod tasks;

use std::sync::Arc;

use config::ServerConfig;
use tasks::service::TaskService;

/// Shared application state passed to every HTTP handler.
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    /// Task CRUD service with its injected storage backend.
    pub service: TaskService,
    pub started_at: std::time::Instant,
}
