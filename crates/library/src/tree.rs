use std::collections::HashMap;
use std::sync::Arc;

use common::Track;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Album,
    Artist,
    Playlist,
}

/// A browsable child: points at another node of the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeItem {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BrowseItem {
    Node(NodeItem),
    Track(Arc<Track>),
}

impl BrowseItem {
    pub fn id(&self) -> &str {
        match self {
            BrowseItem::Node(node) => &node.id,
            BrowseItem::Track(track) => &track.id,
        }
    }

    pub fn as_node(&self) -> Option<&NodeItem> {
        match self {
            BrowseItem::Node(node) => Some(node),
            BrowseItem::Track(_) => None,
        }
    }

    pub fn is_browsable(&self) -> bool {
        matches!(self, BrowseItem::Node(_))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub tracks: usize,
    pub albums: usize,
    pub artists: usize,
    pub playlists: usize,
    pub recommended: usize,
}

/// Node id to ordered children. Built once by [`crate::TreeBuilder`] and
/// read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowseTree {
    nodes: HashMap<String, Vec<BrowseItem>>,
    stats: TreeStats,
}

impl BrowseTree {
    pub(crate) fn from_parts(nodes: HashMap<String, Vec<BrowseItem>>, stats: TreeStats) -> Self {
        Self { nodes, stats }
    }

    /// Children of `node_id`, or `None` when no such node was created.
    /// Tracks are leaves and never have an entry.
    pub fn get(&self, node_id: &str) -> Option<&[BrowseItem]> {
        self.nodes.get(node_id).map(Vec::as_slice)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }
}
