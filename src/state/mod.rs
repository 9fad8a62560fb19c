pub mod session;

pub use session::{Flash, FlashLevel, Session, SessionStore};

use crate::utils::AppConfig;
use crate::workflow::WorkflowService;
use std::sync::Arc;

/// Shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub workflow: Arc<WorkflowService>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig, workflow: WorkflowService) -> Self {
        Self {
            config: Arc::new(config),
            workflow: Arc::new(workflow),
            sessions: SessionStore::new(),
        }
    }
}
