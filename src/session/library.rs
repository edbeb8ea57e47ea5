//! The track library: playlists and their tracks.
//!
//! The library is read-only after startup. It is loaded from a JSON file
//! named in the configuration, or starts empty.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Library loading errors.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read library file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse library file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One track's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
}

/// A named, ordered collection of tracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// All playlists known to the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

impl Library {
    /// Load a library from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LibraryError> {
        let content = std::fs::read_to_string(path)?;
        let library: Library = serde_json::from_str(&content)?;
        Ok(library)
    }

    pub fn playlist(&self, idx: u32) -> Option<&Playlist> {
        self.playlists.get(idx as usize)
    }

    /// Find a track anywhere in the library by id.
    pub fn track_by_id(&self, id: &str) -> Option<&Track> {
        self.playlists
            .iter()
            .flat_map(|pl| pl.tracks.iter())
            .find(|t| t.id == id)
    }

    /// All tracks matching a predicate, deduplicated by id in first-seen
    /// order.
    pub fn tracks_where<F>(&self, mut pred: F) -> Vec<Track>
    where
        F: FnMut(&Track) -> bool,
    {
        let mut seen = std::collections::HashSet::new();
        self.playlists
            .iter()
            .flat_map(|pl| pl.tracks.iter())
            .filter(|t| pred(t) && seen.insert(t.id.clone()))
            .cloned()
            .collect()
    }
}
