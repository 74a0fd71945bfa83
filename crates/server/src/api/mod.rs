pub mod browse;
pub mod library;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ::library::BrowseTree;

use crate::state::{AppState, HealthResponse, LibraryStatus};
use crate::utils::json_error;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/library/status", get(library::get_status))
        .route("/library/reload", post(library::reload))
        .route("/browse", get(browse::list_children))
        .route("/browse/root", get(browse::get_root))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub(crate) fn tree_or_json_error(
    state: &AppState,
) -> Result<Arc<BrowseTree>, (StatusCode, Json<crate::state::ErrorResponse>)> {
    let guard = state.library_state.read();
    if let Some(tree) = guard.tree.clone() {
        Ok(tree)
    } else {
        Err(json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            library_status_message(&guard.status),
        ))
    }
}

pub(crate) fn library_status_message(status: &LibraryStatus) -> String {
    match status {
        LibraryStatus::Unconfigured => "music directory must be set".to_string(),
        LibraryStatus::Missing(path) => {
            format!("music directory not found: {}", path.display())
        }
        LibraryStatus::Loading { .. } => "library indexing in progress".to_string(),
        LibraryStatus::Ready(_) => "library ready".to_string(),
        LibraryStatus::Error(message) => format!("library error: {}", message),
    }
}
