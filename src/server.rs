use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::sources::{LabelFile, SandboxClient};
use crate::state::AppState;

/// Build the application state and Axum router from a [`Config`].
///
/// Wires the banking sandbox client and the label file as collaborators and
/// assembles the middleware stack. Returns the shared state and a
/// ready-to-serve router.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let source = SandboxClient::from_config(&config)?;
    let labels = LabelFile::new(&config.labels_path);
    tracing::info!(
        sandbox = %config.sandbox_url,
        labels = %config.labels_path.display(),
        timezone = %config.timezone,
        "Configured collaborators"
    );

    let state = AppState::new(config, Arc::new(source), Arc::new(labels));
    Ok((state.clone(), build_router(state)))
}

/// Router with middleware for an already assembled state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
