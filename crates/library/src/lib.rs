mod builder;
mod catalog;
mod playlists;
mod source;
mod tree;

pub use builder::TreeBuilder;
pub use catalog::FolderCatalog;
pub use playlists::{
    load_playlist_snapshot, JsonPlaylistStore, PlaylistRecord, PlaylistRepository, PlaylistsDocument,
    SongRecord,
};
pub use source::{Catalog, CatalogProvider, MusicSource, SourceState};
pub use tree::{BrowseItem, BrowseTree, NodeItem, NodeKind, TreeStats};

use metadata::MetadataError;

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Metadata(MetadataError),
    Walk(walkdir::Error),
    Provider(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Io(err) => write!(f, "io error: {}", err),
            LibraryError::Json(err) => write!(f, "json error: {}", err),
            LibraryError::Metadata(err) => write!(f, "metadata error: {}", err),
            LibraryError::Walk(err) => write!(f, "walk error: {}", err),
            LibraryError::Provider(message) => write!(f, "catalog provider error: {}", message),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::Io(err)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::Json(err)
    }
}

impl From<MetadataError> for LibraryError {
    fn from(err: MetadataError) -> Self {
        LibraryError::Metadata(err)
    }
}

impl From<walkdir::Error> for LibraryError {
    fn from(err: walkdir::Error) -> Self {
        LibraryError::Walk(err)
    }
}
