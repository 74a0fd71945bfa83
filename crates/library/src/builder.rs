use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use common::{is_reserved_id, Playlist, Track, ALBUMS, ARTISTS, PLAYLISTS, RECOMMENDED, ROOT};
use tracing::{info, warn};

use crate::playlists::{load_playlist_snapshot, PlaylistRepository};
use crate::source::{Catalog, CatalogProvider, MusicSource};
use crate::tree::{BrowseItem, BrowseTree, NodeItem, NodeKind, TreeStats};

const CATEGORIES: [(&str, &str); 4] = [
    (RECOMMENDED, "Recommended"),
    (ALBUMS, "Albums"),
    (ARTISTS, "Artists"),
    (PLAYLISTS, "Playlists"),
];

struct PlaylistMatcher {
    node_id: String,
    routes: HashSet<String>,
}

/// Single-pass grouping of tracks into album, artist, playlist and
/// recommended nodes. Feed every track once through [`TreeBuilder::add_track`]
/// and call [`TreeBuilder::finish`].
pub struct TreeBuilder {
    nodes: HashMap<String, Vec<BrowseItem>>,
    albums: HashSet<String>,
    artists: HashSet<String>,
    playlists: Vec<PlaylistMatcher>,
    tracks: usize,
}

impl TreeBuilder {
    pub fn new(playlists: &[Playlist]) -> Self {
        let mut builder = Self {
            nodes: HashMap::new(),
            albums: HashSet::new(),
            artists: HashSet::new(),
            playlists: Vec::new(),
            tracks: 0,
        };

        for (id, title) in CATEGORIES {
            builder.nodes.insert(id.to_string(), Vec::new());
            builder.register(
                ROOT,
                NodeItem {
                    id: id.to_string(),
                    kind: NodeKind::Category,
                    title: title.to_string(),
                    subtitle: None,
                    artwork: None,
                },
            );
        }

        for playlist in playlists {
            builder.add_playlist(playlist);
        }
        builder
    }

    fn add_playlist(&mut self, playlist: &Playlist) {
        if is_reserved_id(&playlist.name) {
            warn!("Skipping playlist with reserved name {:?}", playlist.name);
            return;
        }

        // Playlists sharing a name share a node; their entries are merged.
        if let Some(existing) = self
            .playlists
            .iter_mut()
            .find(|matcher| matcher.node_id == playlist.name)
        {
            existing.routes.extend(playlist.entries.iter().cloned());
            return;
        }

        self.nodes.entry(playlist.name.clone()).or_default();
        self.register(
            PLAYLISTS,
            NodeItem {
                id: playlist.name.clone(),
                kind: NodeKind::Playlist,
                title: playlist.name.clone(),
                subtitle: None,
                artwork: None,
            },
        );
        self.playlists.push(PlaylistMatcher {
            node_id: playlist.name.clone(),
            routes: playlist.entries.iter().cloned().collect(),
        });
    }

    pub fn add_track(&mut self, track: &Arc<Track>) {
        self.tracks += 1;

        let album_id = track.album_node_id();
        if self.albums.insert(album_id.clone()) {
            self.register(
                ALBUMS,
                NodeItem {
                    id: album_id.clone(),
                    kind: NodeKind::Album,
                    title: track.album.clone(),
                    subtitle: Some(track.artist.clone()),
                    artwork: track.artwork.clone(),
                },
            );
        }

        let artist_id = track.artist_node_id();
        if self.artists.insert(artist_id.clone()) {
            self.register(
                ARTISTS,
                NodeItem {
                    id: artist_id.clone(),
                    kind: NodeKind::Artist,
                    title: track.artist.clone(),
                    subtitle: None,
                    artwork: track.artwork.clone(),
                },
            );
        }

        let item = BrowseItem::Track(Arc::clone(track));
        self.children_mut(&album_id).push(item.clone());
        // An album and an artist with the same name share one node.
        if artist_id != album_id {
            self.children_mut(&artist_id).push(item.clone());
        }

        let Self {
            nodes, playlists, ..
        } = self;
        for matcher in playlists.iter() {
            if matcher.node_id == album_id || matcher.node_id == artist_id {
                continue;
            }
            if matcher.routes.contains(&track.source) {
                children_mut(nodes, &matcher.node_id).push(item.clone());
            }
        }

        if track.is_album_opener() {
            self.children_mut(RECOMMENDED).push(item);
        }
    }

    pub fn finish(self) -> BrowseTree {
        let stats = TreeStats {
            tracks: self.tracks,
            albums: self.albums.len(),
            artists: self.artists.len(),
            playlists: self.playlists.len(),
            recommended: self.nodes.get(RECOMMENDED).map(Vec::len).unwrap_or(0),
        };
        BrowseTree::from_parts(self.nodes, stats)
    }

    fn register(&mut self, parent: &str, node: NodeItem) {
        self.children_mut(parent).push(BrowseItem::Node(node));
    }

    fn children_mut(&mut self, node_id: &str) -> &mut Vec<BrowseItem> {
        children_mut(&mut self.nodes, node_id)
    }
}

fn children_mut<'a>(
    nodes: &'a mut HashMap<String, Vec<BrowseItem>>,
    node_id: &str,
) -> &'a mut Vec<BrowseItem> {
    nodes.entry(node_id.to_string()).or_default()
}

impl BrowseTree {
    pub fn build(catalog: &Catalog, playlists: &[Playlist]) -> Self {
        let mut builder = TreeBuilder::new(playlists);
        for track in catalog {
            builder.add_track(track);
        }
        builder.finish()
    }

    /// Builds from a source that has already been loaded. A source in the
    /// error state contributes no tracks; the categories are still created.
    pub fn from_source<P: CatalogProvider>(
        source: &MusicSource<P>,
        playlists: &dyn PlaylistRepository,
    ) -> Self {
        let playlists = load_playlist_snapshot(playlists);
        let tree = Self::build(&source.tracks(), &playlists);
        let stats = tree.stats();
        info!(
            "Browse tree built: {} tracks, {} albums, {} artists, {} playlists",
            stats.tracks, stats.albums, stats.artists, stats.playlists
        );
        tree
    }
}
