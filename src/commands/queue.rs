//! Queue commands: inspection, editing, and playlist playback.

use super::{OpFuture, status_payload, track_payload};
use crate::session::Session;
use serde_json::json;
use std::sync::Arc;

/// `qls` - list the queue.
pub(crate) fn queue_list(session: Arc<Session>) -> OpFuture {
    Box::pin(async move {
        let (tracks, current) = session.queue_snapshot().await;
        let tracks: Vec<_> = tracks
            .iter()
            .enumerate()
            .map(|(index, t)| {
                let mut doc = track_payload(t);
                doc["index"] = json!(index);
                doc
            })
            .collect();
        let mut doc = json!({ "tracks": tracks });
        if let Some(current) = current {
            doc["current"] = json!(current);
        }
        Ok(doc)
    })
}

/// `qclear` - empty the queue.
pub(crate) fn queue_clear(session: Arc<Session>) -> OpFuture {
    Box::pin(async move {
        let removed = session.queue_clear().await;
        Ok(json!({ "removed": removed }))
    })
}

/// `qrm <idx>` - remove one queue entry.
pub(crate) fn queue_remove(session: Arc<Session>, idx: u32) -> OpFuture {
    Box::pin(async move {
        let track = session.queue_remove(idx).await?;
        Ok(json!({ "removed": 1, "track": track_payload(&track) }))
    })
}

/// `qrm <first> <last>` - remove an inclusive range of queue entries.
pub(crate) fn queue_remove_range(session: Arc<Session>, first: u32, last: u32) -> OpFuture {
    Box::pin(async move {
        let removed = session.queue_remove_range(first, last).await?;
        Ok(json!({ "removed": removed }))
    })
}

/// `add <pl>` - append a playlist to the queue.
pub(crate) fn add_playlist(session: Arc<Session>, pl: u32) -> OpFuture {
    Box::pin(async move {
        let queued = session.enqueue_playlist(pl).await?;
        Ok(json!({ "queued": queued }))
    })
}

/// `add <pl> <tr>` - append one playlist track to the queue.
pub(crate) fn add_track(session: Arc<Session>, pl: u32, tr: u32) -> OpFuture {
    Box::pin(async move {
        let track = session.enqueue_track(pl, tr).await?;
        Ok(json!({ "queued": 1, "track": track_payload(&track) }))
    })
}

/// `play <pl>` - replace the queue with a playlist and play it.
pub(crate) fn play_playlist(session: Arc<Session>, pl: u32) -> OpFuture {
    Box::pin(async move { session.play_playlist(pl).await.map(|s| status_payload(&s)) })
}

/// `play <pl> <tr>` - play a single playlist track.
pub(crate) fn play_track(session: Arc<Session>, pl: u32, tr: u32) -> OpFuture {
    Box::pin(async move { session.play_track(pl, tr).await.map(|s| status_payload(&s)) })
}
