//! Transport commands: status, play/pause, seeking, queue navigation.

use super::{OpFuture, status_payload};
use crate::session::Session;
use std::sync::Arc;

/// `status` - report the player state.
pub(crate) fn status(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.status().await)) })
}

/// `repeat` - toggle repeat mode.
pub(crate) fn repeat(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.toggle_repeat().await)) })
}

/// `shuffle` - toggle shuffle mode.
pub(crate) fn shuffle(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.toggle_shuffle().await)) })
}

/// `play` - resume playback.
pub(crate) fn play(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.play().await)) })
}

/// `toggle` - flip between playing and paused.
pub(crate) fn toggle(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.toggle().await)) })
}

/// `stop` - stop playback and rewind.
pub(crate) fn stop(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.stop().await)) })
}

/// `seek <ms>` - seek within the current track.
pub(crate) fn seek(session: Arc<Session>, pos_ms: u32) -> OpFuture {
    Box::pin(async move { session.seek(pos_ms).await.map(|s| status_payload(&s)) })
}

/// `next` - advance to the next queue entry.
pub(crate) fn next(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.next().await)) })
}

/// `prev` - go back one queue entry.
pub(crate) fn prev(session: Arc<Session>) -> OpFuture {
    Box::pin(async move { Ok(status_payload(&session.prev().await)) })
}

/// `goto <idx>` - jump to an absolute queue position.
pub(crate) fn goto(session: Arc<Session>, idx: u32) -> OpFuture {
    Box::pin(async move { session.goto(idx).await.map(|s| status_payload(&s)) })
}
