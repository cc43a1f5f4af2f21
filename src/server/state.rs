// Shared application state

use std::sync::Arc;

use crate::downloader::tools::ToolManager;
use crate::downloader::Orchestrator;

pub struct ServiceContext {
    pub orchestrator: Orchestrator,
    pub tools: ToolManager,
}

/// Application state shared across all handlers
pub type AppState = Arc<ServiceContext>;
