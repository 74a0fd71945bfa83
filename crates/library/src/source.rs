use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use common::Track;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::LibraryError;

/// Supplies the full track set in a stable order.
///
/// `Ok(None)` is an absent result (the backing store could not be queried at
/// all); the source treats it the same way as an error.
pub trait CatalogProvider: Send + Sync {
    fn fetch(&self) -> Result<Option<Vec<Track>>, LibraryError>;
}

impl CatalogProvider for Vec<Track> {
    fn fetch(&self) -> Result<Option<Vec<Track>>, LibraryError> {
        Ok(Some(self.clone()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SourceState {
    Uninitialized = 0,
    Initializing = 1,
    Initialized = 2,
    Error = 3,
}

impl SourceState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SourceState::Initializing,
            2 => SourceState::Initialized,
            3 => SourceState::Error,
            _ => SourceState::Uninitialized,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SourceState::Initialized | SourceState::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceState::Uninitialized => "uninitialized",
            SourceState::Initializing => "initializing",
            SourceState::Initialized => "initialized",
            SourceState::Error => "error",
        }
    }
}

/// Immutable, cheaply clonable snapshot of a loaded track sequence.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tracks: Arc<Vec<Arc<Track>>>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: Arc::new(tracks.into_iter().map(Arc::new).collect()),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Track>> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Arc<Track>;
    type IntoIter = std::slice::Iter<'a, Arc<Track>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct MusicSource<P> {
    provider: P,
    state: AtomicU8,
    catalog: RwLock<Catalog>,
    last_error: RwLock<Option<String>>,
}

impl<P: CatalogProvider> MusicSource<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: AtomicU8::new(SourceState::Uninitialized as u8),
            catalog: RwLock::new(Catalog::default()),
            last_error: RwLock::new(None),
        }
    }

    /// Fetches the whole catalog from the provider. Blocks for as long as the
    /// provider does; call it from a blocking task.
    pub fn load(&self) -> SourceState {
        self.state
            .store(SourceState::Initializing as u8, Ordering::Release);

        let (catalog, error) = match self.provider.fetch() {
            Ok(Some(tracks)) if tracks.is_empty() => {
                (None, Some("catalog provider returned no tracks".to_string()))
            }
            Ok(Some(tracks)) => (Some(Catalog::new(tracks)), None),
            Ok(None) => (None, Some("catalog provider returned no result".to_string())),
            Err(err) => (None, Some(err.to_string())),
        };

        // The catalog must be in place before the state flips, readers gate on state.
        let next = match catalog {
            Some(catalog) => {
                info!("Catalog loaded: {} tracks", catalog.len());
                *self.catalog.write() = catalog;
                *self.last_error.write() = None;
                SourceState::Initialized
            }
            None => {
                let message = error.unwrap_or_default();
                warn!("Catalog load failed: {}", message);
                *self.catalog.write() = Catalog::default();
                *self.last_error.write() = Some(message);
                SourceState::Error
            }
        };
        self.state.store(next as u8, Ordering::Release);
        next
    }

    pub fn state(&self) -> SourceState {
        SourceState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Empty unless the last load succeeded.
    pub fn tracks(&self) -> Catalog {
        match self.state() {
            SourceState::Initialized => self.catalog.read().clone(),
            _ => Catalog::default(),
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
