use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::SystemTime;

use library::{BrowseTree, FolderCatalog, JsonPlaylistStore, MusicSource, SourceState};
use tracing::{info, warn};

use crate::config::{resolve_music_root, resolve_path};
use crate::state::{AppState, LibraryStatus};
use crate::watch::configure_watcher;

pub struct LoadOutcome {
    pub tree: BrowseTree,
    pub source_state: SourceState,
    pub error: Option<String>,
}

/// One full load cycle: catalog, then playlists, then the tree. Blocking.
pub fn load_tree(root: PathBuf, playlists_path: PathBuf) -> LoadOutcome {
    let source = MusicSource::new(FolderCatalog::new(root));
    let source_state = source.load();
    let playlists = JsonPlaylistStore::new(playlists_path);
    let tree = BrowseTree::from_source(&source, &playlists);
    LoadOutcome {
        tree,
        source_state,
        error: source.last_error(),
    }
}

pub fn playlists_path(state: &AppState) -> PathBuf {
    let config = state.config.read();
    resolve_path(&state.config_path, &config.playlists_path)
}

pub fn start_index(state: AppState, root: PathBuf) {
    let generation = begin_load(&state);
    let playlists_path = playlists_path(&state);
    tokio::spawn(async move {
        info!("Library load started: {}", root.display());
        let load_root = root.clone();
        let load_playlists = playlists_path.clone();
        let result = tokio::task::spawn_blocking(move || load_tree(load_root, load_playlists))
            .await
            .map_err(|err| err.to_string());
        publish_outcome(&state, generation, root, playlists_path, result);
    });
}

/// Marks the library as loading and returns the generation of the new load.
fn begin_load(state: &AppState) -> u64 {
    let mut guard = state.library_state.write();
    let generation = state.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
    guard.tree = None;
    guard.status = LibraryStatus::Loading {
        started: SystemTime::now(),
    };
    guard.source_state = SourceState::Initializing;
    *state.watcher.write() = None;
    generation
}

/// Stores a finished load unless a newer load or a missing-root update
/// superseded it. The generation is checked under the same lock that
/// publishes, so a stale result never lands and never re-arms the watcher.
fn publish_outcome(
    state: &AppState,
    generation: u64,
    root: PathBuf,
    playlists_path: PathBuf,
    result: Result<LoadOutcome, String>,
) -> bool {
    let mut guard = state.library_state.write();
    if state.load_generation.load(Ordering::SeqCst) != generation {
        info!("Discarding superseded library load");
        return false;
    }

    match result {
        Ok(outcome) => {
            let stats = outcome.tree.stats();
            guard.tree = Some(Arc::new(outcome.tree));
            guard.source_state = outcome.source_state;
            if outcome.source_state == SourceState::Initialized {
                guard.status = LibraryStatus::Ready(stats);
                info!(
                    "Library ready: {} tracks, {} albums, {} artists, {} playlists",
                    stats.tracks, stats.albums, stats.artists, stats.playlists
                );
            } else {
                guard.status = LibraryStatus::Error(
                    outcome
                        .error
                        .unwrap_or_else(|| "catalog unavailable".to_string()),
                );
                warn!("Library load failed; serving empty categories");
            }
            configure_watcher(state, root, playlists_path);
        }
        Err(message) => {
            guard.tree = None;
            guard.source_state = SourceState::Error;
            guard.status = LibraryStatus::Error(message.clone());
            warn!("Library load join error: {}", message);
        }
    }
    true
}

pub fn set_library_missing(state: &AppState, path: PathBuf) {
    let mut guard = state.library_state.write();
    state.load_generation.fetch_add(1, Ordering::SeqCst);
    guard.tree = None;
    guard.source_state = SourceState::Uninitialized;
    guard.status = LibraryStatus::Missing(path);
}

/// Rebuilds from the configured music root. Returns whether a load started
/// and a message for the caller.
pub fn reload_library(state: AppState) -> (bool, String) {
    let music_root = {
        let config = state.config.read();
        resolve_music_root(&state.config_path, &config.music_root)
    };
    let Some(path) = music_root else {
        return (false, "Music directory is not configured.".to_string());
    };
    if !path.exists() {
        set_library_missing(&state, path);
        return (false, "Music directory not found.".to_string());
    }
    start_index(state, path);
    (true, "Library load started.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use common::{ALBUMS, PLAYLISTS, ROOT};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn idle_state(dir: &Path) -> AppState {
        let config = ServerConfig {
            watch_music: false,
            ..ServerConfig::default()
        };
        AppState::new(dir.join("config.yaml"), config)
    }

    fn music_dir(dir: &Path) -> PathBuf {
        let music = dir.join("music");
        fs::create_dir_all(&music).unwrap();
        fs::write(music.join("song.mp3"), b"not real").unwrap();
        music
    }

    #[test]
    fn superseded_load_is_not_published() {
        let dir = tempdir().unwrap();
        let music = music_dir(dir.path());
        let playlists = dir.path().join("playlists.json");
        let state = idle_state(dir.path());

        let stale = begin_load(&state);
        let current = begin_load(&state);
        assert_ne!(stale, current);

        let published = publish_outcome(
            &state,
            stale,
            music.clone(),
            playlists.clone(),
            Ok(load_tree(music.clone(), playlists.clone())),
        );
        assert!(!published);
        {
            let guard = state.library_state.read();
            assert!(guard.tree.is_none());
            assert!(matches!(guard.status, LibraryStatus::Loading { .. }));
            assert_eq!(guard.source_state, SourceState::Initializing);
        }

        let published = publish_outcome(
            &state,
            current,
            music.clone(),
            playlists.clone(),
            Ok(load_tree(music, playlists)),
        );
        assert!(published);
        let guard = state.library_state.read();
        assert!(guard.tree.is_some());
        assert_eq!(guard.source_state, SourceState::Initialized);
        assert!(matches!(guard.status, LibraryStatus::Ready(stats) if stats.tracks == 1));
    }

    #[test]
    fn missing_root_supersedes_an_inflight_load() {
        let dir = tempdir().unwrap();
        let music = music_dir(dir.path());
        let playlists = dir.path().join("playlists.json");
        let state = idle_state(dir.path());

        let generation = begin_load(&state);
        set_library_missing(&state, music.clone());

        let published = publish_outcome(
            &state,
            generation,
            music.clone(),
            playlists.clone(),
            Ok(load_tree(music, playlists)),
        );
        assert!(!published);
        let guard = state.library_state.read();
        assert!(guard.tree.is_none());
        assert!(matches!(guard.status, LibraryStatus::Missing(_)));
    }

    #[test]
    fn failed_join_is_reported_as_error() {
        let dir = tempdir().unwrap();
        let state = idle_state(dir.path());
        let generation = begin_load(&state);
        let published = publish_outcome(
            &state,
            generation,
            dir.path().join("music"),
            dir.path().join("playlists.json"),
            Err("task panicked".to_string()),
        );
        assert!(published);
        let guard = state.library_state.read();
        assert!(guard.tree.is_none());
        assert_eq!(guard.source_state, SourceState::Error);
        assert!(matches!(&guard.status, LibraryStatus::Error(message) if message == "task panicked"));
    }

    #[test]
    fn load_tree_indexes_folder_and_playlists() {
        let dir = tempdir().unwrap();
        let music = dir.path().join("music");
        fs::create_dir_all(&music).unwrap();
        let song = music.join("song.mp3");
        fs::write(&song, b"not real").unwrap();

        let playlists = dir.path().join("playlists.json");
        fs::write(
            &playlists,
            format!(
                r#"{{"playlists": [{{"name": "Mix", "songs": [{{"route": {:?}}}]}}]}}"#,
                song.to_string_lossy()
            ),
        )
        .unwrap();

        let outcome = load_tree(music, playlists);
        assert_eq!(outcome.source_state, SourceState::Initialized);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.tree.get(ROOT).unwrap().len(), 4);
        assert_eq!(outcome.tree.get(ALBUMS).unwrap().len(), 1);
        assert_eq!(outcome.tree.get(PLAYLISTS).unwrap().len(), 1);
        assert_eq!(outcome.tree.get("Mix").unwrap().len(), 1);
    }

    #[test]
    fn load_tree_degrades_when_everything_is_missing() {
        let dir = tempdir().unwrap();
        let outcome = load_tree(dir.path().join("missing"), dir.path().join("none.json"));
        assert_eq!(outcome.source_state, SourceState::Error);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.tree.get(ROOT).unwrap().len(), 4);
        assert!(outcome.tree.get(ALBUMS).unwrap().is_empty());
        assert!(outcome.tree.get(PLAYLISTS).unwrap().is_empty());
    }
}
