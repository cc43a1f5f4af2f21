// HTTP service adapter

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;

use tracing::info;

pub use error::HttpError;
pub use routes::create_router;
pub use state::{AppState, ServiceContext};

use crate::config::Settings;

/// Build state from settings, bind, and serve until Ctrl-C
pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    settings.ensure_save_dir().await?;

    let state: AppState = Arc::new(ServiceContext {
        orchestrator: settings.orchestrator(),
        tools: settings.tool_manager(),
    });
    let extractor = state.orchestrator.extractor_name();
    let save_dir = state.orchestrator.jobs().save_dir().display().to_string();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    info!(bind = %settings.bind, extractor, save_dir = %save_dir, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
