use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ROOT: &str = "/";
pub const EMPTY_ROOT: &str = "@empty@";
pub const RECOMMENDED: &str = "__RECOMMENDED__";
pub const ALBUMS: &str = "__ALBUMS__";
pub const ARTISTS: &str = "__ARTISTS__";
pub const PLAYLISTS: &str = "__PLAYLISTS__";

pub const UNKNOWN_TRACK_NUMBER: u32 = 0;
pub const UNKNOWN_DURATION: i64 = -1;

/// A playable catalog entry. `source` is the locator playlists refer to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(default)]
    pub genre: String,
    pub source: String,
    #[serde(default)]
    pub artwork: Option<String>,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub total_track_count: u32,
    #[serde(default = "unknown_duration")]
    pub duration_ms: i64,
}

impl Track {
    pub fn album_node_id(&self) -> String {
        node_id_for_name(&self.album)
    }

    pub fn artist_node_id(&self) -> String {
        node_id_for_name(&self.artist)
    }

    pub fn is_album_opener(&self) -> bool {
        self.track_number == 1
    }
}

fn unknown_duration() -> i64 {
    UNKNOWN_DURATION
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<String>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.iter().any(|entry| entry == source)
    }
}

/// Album and artist nodes are keyed by their escaped name, so the id is
/// safe to use as a single path or query segment. Names that would escape to
/// a category id get their underscores escaped too.
pub fn node_id_for_name(name: &str) -> String {
    let encoded = urlencoding::encode(name).into_owned();
    if is_category_id(&encoded) {
        encoded.replace('_', "%5F")
    } else {
        encoded
    }
}

pub fn is_reserved_id(node_id: &str) -> bool {
    node_id == ROOT || node_id == EMPTY_ROOT || is_category_id(node_id)
}

pub fn is_category_id(node_id: &str) -> bool {
    matches!(node_id, RECOMMENDED | ALBUMS | ARTISTS | PLAYLISTS)
}

pub fn stable_id(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

pub fn relpath_from(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(path_to_slash_string(rel))
}

fn path_to_slash_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    parts.join("/")
}
