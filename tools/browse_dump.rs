use std::env;
use std::path::PathBuf;

use common::ROOT;
use library::{BrowseItem, BrowseTree, FolderCatalog, JsonPlaylistStore, MusicSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let music_root = args
        .next()
        .or_else(|| env::var("MUSIC_ROOT").ok())
        .ok_or("MUSIC_ROOT not set and no path argument")?;
    let playlists_path = args
        .next()
        .or_else(|| env::var("PLAYLISTS_PATH").ok())
        .unwrap_or_else(|| "playlists.json".to_string());
    let node_id = args.next().unwrap_or_else(|| ROOT.to_string());

    let source = MusicSource::new(FolderCatalog::new(PathBuf::from(&music_root)));
    let state = source.load();
    info!("Source {} is {}", music_root, state.as_str());
    if let Some(err) = source.last_error() {
        eprintln!("catalog error: {}", err);
    }

    let playlists = JsonPlaylistStore::new(PathBuf::from(&playlists_path));
    let tree = BrowseTree::from_source(&source, &playlists);

    let Some(children) = tree.get(&node_id) else {
        return Err(format!("node not found: {}", node_id).into());
    };
    println!("{} ({} children)", node_id, children.len());
    for item in children {
        match item {
            BrowseItem::Node(node) => println!("  [{:?}] {}  {}", node.kind, node.id, node.title),
            BrowseItem::Track(track) => println!(
                "  #{:<3} {}  {} - {}",
                track.track_number, track.id, track.artist, track.title
            ),
        }
    }

    let stats = tree.stats();
    println!(
        "Indexed: {} tracks, {} albums, {} artists, {} playlists, {} recommended",
        stats.tracks, stats.albums, stats.artists, stats.playlists, stats.recommended
    );

    Ok(())
}
