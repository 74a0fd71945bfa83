use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use common::{EMPTY_ROOT, ROOT};

use crate::state::{AppState, BrowseQuery, BrowseResponse, BrowseRootResponse, JsonResult};
use crate::utils::json_error;

use super::tree_or_json_error;

pub async fn get_root(State(state): State<AppState>) -> Json<BrowseRootResponse> {
    let has_tree = state.library_state.read().tree.is_some();
    Json(BrowseRootResponse {
        root: if has_tree { ROOT } else { EMPTY_ROOT },
    })
}

/// Children of `?id=` (the root when omitted). 404 distinguishes an unknown
/// node from a known node with no children.
pub async fn list_children(
    State(state): State<AppState>,
    Query(params): Query<BrowseQuery>,
) -> JsonResult<BrowseResponse> {
    let node_id = params
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| ROOT.to_string());
    if node_id == EMPTY_ROOT {
        return Ok(Json(BrowseResponse {
            id: node_id,
            items: Vec::new(),
        }));
    }

    let tree = tree_or_json_error(&state)?;
    match tree.get(&node_id) {
        Some(items) => Ok(Json(BrowseResponse {
            id: node_id,
            items: items.to_vec(),
        })),
        None => Err(json_error(StatusCode::NOT_FOUND, "node not found".to_string())),
    }
}
