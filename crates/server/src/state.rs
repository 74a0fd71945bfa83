use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::SystemTime;

use axum::http::StatusCode;
use axum::Json;
use library::{BrowseItem, BrowseTree, SourceState, TreeStats};
use notify::RecommendedWatcher;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub library_state: Arc<RwLock<LibraryState>>,
    pub config_path: PathBuf,
    pub config: Arc<RwLock<ServerConfig>>,
    pub watcher: Arc<RwLock<Option<RecommendedWatcher>>>,
    /// Bumped by every load; results of superseded loads are dropped.
    pub load_generation: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config_path: PathBuf, config: ServerConfig) -> Self {
        Self {
            library_state: Arc::new(RwLock::new(LibraryState::default())),
            config_path,
            config: Arc::new(RwLock::new(config)),
            watcher: Arc::new(RwLock::new(None)),
            load_generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[derive(Clone)]
pub struct LibraryState {
    pub tree: Option<Arc<BrowseTree>>,
    pub status: LibraryStatus,
    pub source_state: SourceState,
}

impl Default for LibraryState {
    fn default() -> Self {
        Self {
            tree: None,
            status: LibraryStatus::Unconfigured,
            source_state: SourceState::Uninitialized,
        }
    }
}

#[derive(Clone, Debug)]
pub enum LibraryStatus {
    Unconfigured,
    Missing(PathBuf),
    Loading { started: SystemTime },
    Ready(TreeStats),
    Error(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LibraryStatusResponse {
    pub status: String,
    pub message: Option<String>,
    pub source_state: SourceState,
    pub stats: Option<TreeStats>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct BrowseRootResponse {
    pub root: &'static str,
}

#[derive(Serialize)]
pub struct BrowseResponse {
    pub id: String,
    pub items: Vec<BrowseItem>,
}

pub type JsonResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;
