use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use common::Playlist;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::LibraryError;

pub trait PlaylistRepository: Send + Sync {
    fn load_playlists(&self) -> Result<Vec<Playlist>, LibraryError>;
}

impl PlaylistRepository for Vec<Playlist> {
    fn load_playlists(&self) -> Result<Vec<Playlist>, LibraryError> {
        Ok(self.clone())
    }
}

/// On-disk shape: `{ "playlists": [ { "name": ..., "songs": [ { "route": ... } ] } ] }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlaylistsDocument {
    #[serde(default)]
    pub playlists: Vec<PlaylistRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<SongRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongRecord {
    pub route: String,
}

impl PlaylistsDocument {
    pub fn into_playlists(self) -> Vec<Playlist> {
        self.playlists
            .into_iter()
            .map(|record| Playlist {
                name: record.name,
                entries: record.songs.into_iter().map(|song| song.route).collect(),
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct JsonPlaylistStore {
    path: PathBuf,
}

impl JsonPlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlaylistRepository for JsonPlaylistStore {
    fn load_playlists(&self) -> Result<Vec<Playlist>, LibraryError> {
        let data = fs::read(&self.path)?;
        let document: PlaylistsDocument = serde_json::from_slice(&data)?;
        let playlists = document.into_playlists();
        debug!("Read {} playlists from {:?}", playlists.len(), self.path);
        Ok(playlists)
    }
}

/// Reads the repository once. A missing or unreadable store yields no
/// playlists rather than failing the build.
pub fn load_playlist_snapshot(repository: &dyn PlaylistRepository) -> Vec<Playlist> {
    match repository.load_playlists() {
        Ok(playlists) => playlists,
        Err(LibraryError::Io(err)) if err.kind() == ErrorKind::NotFound => {
            info!("No playlist store found; continuing without playlists");
            Vec::new()
        }
        Err(err) => {
            warn!("Failed to read playlists: {}", err);
            Vec::new()
        }
    }
}
