use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use common::{relpath_from, stable_id, Track, UNKNOWN_DURATION, UNKNOWN_TRACK_NUMBER};
use metadata::{read_tags, TagInfo};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::source::CatalogProvider;
use crate::LibraryError;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "m4a"];

const COVERS: &[&str] = &[
    "cover.jpg",
    "cover.jpeg",
    "cover.png",
    "folder.jpg",
    "folder.jpeg",
    "folder.png",
    "front.jpg",
    "front.jpeg",
    "front.png",
    "album.jpg",
    "album.png",
];

/// Catalog backed by a directory of audio files. Tracks come back in path
/// order so repeated loads of an unchanged folder are identical.
#[derive(Clone, Debug)]
pub struct FolderCatalog {
    root: PathBuf,
}

impl FolderCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CatalogProvider for FolderCatalog {
    fn fetch(&self) -> Result<Option<Vec<Track>>, LibraryError> {
        if !self.root.is_dir() {
            warn!("Music directory not found: {}", self.root.display());
            return Ok(None);
        }

        let files = audio_files(&self.root)?;
        info!("Found {} audio files under {}", files.len(), self.root.display());

        let mut covers: HashMap<PathBuf, Option<String>> = HashMap::new();
        let mut tracks = Vec::with_capacity(files.len());
        for file in files {
            let tags = match read_tags(&file) {
                Ok(tags) => tags,
                Err(err) => {
                    debug!("Unreadable tags in {:?}: {}", file, err);
                    TagInfo::default()
                }
            };
            let artwork = file.parent().and_then(|dir| {
                covers
                    .entry(dir.to_path_buf())
                    .or_insert_with(|| find_folder_cover(dir))
                    .clone()
            });
            tracks.push(track_from_tags(&self.root, &file, tags, artwork));
        }
        Ok(Some(tracks))
    }
}

fn audio_files(root: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself must be readable; anything below is best effort.
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.file_type().is_file() && is_audio_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn track_from_tags(root: &Path, file: &Path, tags: TagInfo, artwork: Option<String>) -> Track {
    let relpath = relpath_from(root, file).unwrap_or_else(|| file.to_string_lossy().to_string());
    Track {
        id: stable_id(&relpath),
        title: tags.title.unwrap_or_else(|| file_stem(file)),
        artist: tags
            .artist
            .unwrap_or_else(|| "Unknown Artist".to_string()),
        album: tags.album.unwrap_or_else(|| "Unknown Album".to_string()),
        genre: tags.genre.unwrap_or_default(),
        source: file.to_string_lossy().to_string(),
        artwork,
        track_number: tags.track_no.unwrap_or(UNKNOWN_TRACK_NUMBER),
        total_track_count: tags.track_total.unwrap_or(0),
        duration_ms: tags
            .duration_ms
            .map(i64::from)
            .unwrap_or(UNKNOWN_DURATION),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown Track".to_string())
}

fn find_folder_cover(dir: &Path) -> Option<String> {
    let entries = fs::read_dir(dir).ok()?;
    let mut found: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|name| COVERS.contains(&name.to_string_lossy().to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    found.sort();
    found
        .into_iter()
        .next()
        .map(|path| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MusicSource, SourceState};
    use crate::tree::BrowseTree;
    use common::{Playlist, ALBUMS, ARTISTS, PLAYLISTS, RECOMMENDED, ROOT};
    use tempfile::tempdir;

    #[test]
    fn matches_audio_extensions_case_insensitive() {
        assert!(is_audio_file(Path::new("/tmp/a.mp3")));
        assert!(is_audio_file(Path::new("/tmp/a.FLAC")));
        assert!(is_audio_file(Path::new("/tmp/a.m4a")));
        assert!(!is_audio_file(Path::new("/tmp/a.txt")));
        assert!(!is_audio_file(Path::new("/tmp/cover.jpg")));
        assert!(!is_audio_file(Path::new("/tmp/a")));
    }

    #[test]
    fn missing_root_is_an_absent_result() {
        let dir = tempdir().unwrap();
        let catalog = FolderCatalog::new(dir.path().join("nowhere"));
        assert!(catalog.fetch().unwrap().is_none());
    }

    #[test]
    fn empty_folder_leaves_source_in_error_with_empty_categories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"no audio here").unwrap();

        let source = MusicSource::new(FolderCatalog::new(dir.path()));
        assert_eq!(source.load(), SourceState::Error);
        assert!(source.tracks().is_empty());

        let tree = BrowseTree::from_source(&source, &Vec::<Playlist>::new());
        assert_eq!(tree.get(ROOT).unwrap().len(), 4);
        for category in [RECOMMENDED, ALBUMS, ARTISTS, PLAYLISTS] {
            assert!(tree.get(category).unwrap().is_empty());
        }
    }

    #[test]
    fn untagged_tracks_fall_back_to_file_names() {
        let dir = tempdir().unwrap();
        let album = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("02 - second.mp3"), b"not a real mp3").unwrap();
        fs::write(album.join("01 - first.ogg"), b"not a real ogg").unwrap();
        fs::write(album.join("notes.txt"), b"ignore me").unwrap();
        fs::write(album.join("Cover.JPG"), b"jpeg").unwrap();

        let catalog = FolderCatalog::new(dir.path());
        let tracks = catalog.fetch().unwrap().unwrap();
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].title, "01 - first");
        assert_eq!(tracks[1].title, "02 - second");
        for track in &tracks {
            assert_eq!(track.artist, "Unknown Artist");
            assert_eq!(track.album, "Unknown Album");
            assert_eq!(track.track_number, UNKNOWN_TRACK_NUMBER);
            assert_eq!(track.duration_ms, UNKNOWN_DURATION);
            assert!(track.artwork.as_deref().unwrap_or("").ends_with("Cover.JPG"));
        }
        assert_eq!(
            tracks[0].source,
            album.join("01 - first.ogg").to_string_lossy()
        );
        assert_eq!(tracks[0].id, stable_id("Artist/Album/01 - first.ogg"));
    }

    #[test]
    fn repeated_fetches_are_identical() {
        let dir = tempdir().unwrap();
        for name in ["b.mp3", "a.mp3", "c.flac"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let catalog = FolderCatalog::new(dir.path());
        let first = catalog.fetch().unwrap().unwrap();
        let second = catalog.fetch().unwrap().unwrap();
        assert_eq!(first, second);
        let titles: Vec<&str> = first.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }
}
