use axum::{extract::State, http::StatusCode, Json};

use crate::scan::reload_library;
use crate::state::{AppState, JsonResult, LibraryStatus, LibraryStatusResponse, ReloadResponse};
use crate::utils::json_error;

use super::library_status_message;

pub async fn get_status(State(state): State<AppState>) -> Json<LibraryStatusResponse> {
    let guard = state.library_state.read();
    let (status, stats) = match &guard.status {
        LibraryStatus::Unconfigured => ("unconfigured", None),
        LibraryStatus::Missing(_) => ("missing", None),
        LibraryStatus::Loading { .. } => ("loading", None),
        LibraryStatus::Ready(stats) => ("ready", Some(*stats)),
        LibraryStatus::Error(_) => ("error", guard.tree.as_ref().map(|tree| tree.stats())),
    };
    let message = match &guard.status {
        LibraryStatus::Ready(_) => None,
        other => Some(library_status_message(other)),
    };
    Json(LibraryStatusResponse {
        status: status.to_string(),
        message,
        source_state: guard.source_state,
        stats,
    })
}

pub async fn reload(State(state): State<AppState>) -> JsonResult<ReloadResponse> {
    let (started, message) = reload_library(state);
    if started {
        Ok(Json(ReloadResponse {
            status: "loading",
            message,
        }))
    } else {
        Err(json_error(StatusCode::BAD_REQUEST, message))
    }
}
