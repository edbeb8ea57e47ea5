//! Link commands: resolving, queueing, and playing resource links.

use super::{OpFuture, status_payload, track_payload};
use crate::session::{Link, Session};
use serde_json::json;
use std::sync::Arc;

/// `uinfo <link>` - describe whatever a link points at.
pub(crate) fn link_info(session: Arc<Session>, link: Link) -> OpFuture {
    Box::pin(async move {
        let tracks = session.resolve_link(&link)?;
        let tracks: Vec<_> = tracks.iter().map(track_payload).collect();
        Ok(json!({
            "uri": link.to_string(),
            "type": link.kind(),
            "tracks": tracks,
        }))
    })
}

/// `uadd <link>` - append a link's tracks to the queue.
pub(crate) fn link_add(session: Arc<Session>, link: Link) -> OpFuture {
    Box::pin(async move {
        let tracks = session.resolve_link(&link)?;
        let queued = session.enqueue(tracks).await;
        Ok(json!({ "uri": link.to_string(), "queued": queued }))
    })
}

/// `uplay <link>` - replace the queue with a link's tracks and play.
pub(crate) fn link_play(session: Arc<Session>, link: Link) -> OpFuture {
    Box::pin(async move {
        let tracks = session.resolve_link(&link)?;
        let snap = session.play_now(tracks).await;
        Ok(status_payload(&snap))
    })
}
