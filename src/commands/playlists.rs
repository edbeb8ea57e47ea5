//! Library commands: playlist listing and search.

use super::{OpFuture, track_payload};
use crate::error::CommandError;
use crate::session::Session;
use serde_json::json;
use std::sync::Arc;

/// `ls` - list all playlists.
pub(crate) fn list_playlists(session: Arc<Session>) -> OpFuture {
    Box::pin(async move {
        let playlists: Vec<_> = session
            .library()
            .playlists
            .iter()
            .enumerate()
            .map(|(index, pl)| {
                json!({
                    "index": index,
                    "name": pl.name,
                    "tracks": pl.tracks.len(),
                })
            })
            .collect();
        Ok(json!({ "playlists": playlists }))
    })
}

/// `ls <idx>` - list one playlist's tracks.
pub(crate) fn list_tracks(session: Arc<Session>, idx: u32) -> OpFuture {
    Box::pin(async move {
        let playlist = session
            .library()
            .playlist(idx)
            .ok_or(CommandError::UnknownPlaylist(idx))?;
        let tracks: Vec<_> = playlist
            .tracks
            .iter()
            .enumerate()
            .map(|(index, t)| {
                let mut doc = track_payload(t);
                doc["index"] = json!(index);
                doc
            })
            .collect();
        Ok(json!({ "playlist": playlist.name, "tracks": tracks }))
    })
}

/// `search <text>` - find tracks by title, artist, or album substring.
pub(crate) fn search(session: Arc<Session>, query: String) -> OpFuture {
    Box::pin(async move {
        let tracks: Vec<_> = session.search(&query).iter().map(track_payload).collect();
        Ok(json!({ "query": query, "tracks": tracks }))
    })
}
