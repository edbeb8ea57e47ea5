//! The playback session: the domain layer every command ultimately drives.
//!
//! A [`Session`] owns the immutable track library plus the mutable player
//! state (queue, transport status, playback position). All mutation goes
//! through its async methods; every state change bumps a generation counter
//! on a watch channel so transports can wait for "something happened"
//! without polling.

mod library;
mod link;

pub use library::{Library, LibraryError, Playlist, Track};
pub use link::{Link, LinkParseError};

use crate::error::CommandError;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Instant;
use tokio::sync::{RwLock, watch};

/// Transport status of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Point-in-time view of the player, safe to hand to serialization code.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub status: PlaybackStatus,
    pub repeat: bool,
    pub shuffle: bool,
    pub queue_len: usize,
    /// Queue position of the current track, if any.
    pub current: Option<usize>,
    pub track: Option<Track>,
    pub position_ms: u64,
    pub since: DateTime<Utc>,
}

/// Mutable player state, guarded by the session lock.
#[derive(Debug, Default)]
struct PlayerState {
    status: PlaybackStatus,
    queue: Vec<Track>,
    current: Option<usize>,
    repeat: bool,
    shuffle: bool,
    /// Position accumulated up to the last transition.
    position_ms: u64,
    /// Set while playing; elapsed time since counts toward the position.
    resumed_at: Option<Instant>,
}

impl PlayerState {
    fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.queue.get(i))
    }

    /// Current playback position, capped at the track duration.
    fn position(&self) -> u64 {
        let raw = match self.resumed_at {
            Some(at) if self.status == PlaybackStatus::Playing => {
                self.position_ms + at.elapsed().as_millis() as u64
            }
            _ => self.position_ms,
        };
        match self.current_track() {
            Some(t) => raw.min(t.duration_ms),
            None => 0,
        }
    }

    /// Start the track at queue index `idx` from the beginning.
    fn start(&mut self, idx: usize) {
        self.current = Some(idx);
        self.position_ms = 0;
        self.resumed_at = Some(Instant::now());
        self.status = PlaybackStatus::Playing;
    }

    fn pause(&mut self) {
        self.position_ms = self.position();
        self.resumed_at = None;
        self.status = PlaybackStatus::Paused;
    }

    fn resume(&mut self) {
        self.resumed_at = Some(Instant::now());
        self.status = PlaybackStatus::Playing;
    }

    fn halt(&mut self) {
        self.position_ms = 0;
        self.resumed_at = None;
        self.status = PlaybackStatus::Stopped;
    }

    /// Queue index to play after the current one, honoring shuffle and
    /// repeat. `None` means playback stops.
    fn next_index(&self) -> Option<usize> {
        if self.queue.is_empty() {
            return None;
        }
        if self.shuffle && self.queue.len() > 1 {
            let mut rng = rand::thread_rng();
            loop {
                let candidate = rng.gen_range(0..self.queue.len());
                if Some(candidate) != self.current {
                    return Some(candidate);
                }
            }
        }
        match self.current {
            None => Some(0),
            Some(i) if i + 1 < self.queue.len() => Some(i + 1),
            Some(_) if self.repeat => Some(0),
            Some(_) => None,
        }
    }

    fn snapshot(&self, since: DateTime<Utc>) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            repeat: self.repeat,
            shuffle: self.shuffle,
            queue_len: self.queue.len(),
            current: self.current,
            track: self.current_track().cloned(),
            position_ms: self.position(),
            since,
        }
    }
}

/// The playback session.
pub struct Session {
    library: Library,
    state: RwLock<PlayerState>,
    changed: watch::Sender<u64>,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(library: Library) -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            library,
            state: RwLock::new(PlayerState::default()),
            changed,
            started_at: Utc::now(),
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Subscribe to state-change notifications. The receiver wakes once per
    /// generation bump after the subscription point.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    fn touch(&self) {
        self.changed.send_modify(|generation| *generation += 1);
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub async fn status(&self) -> StatusSnapshot {
        self.state.read().await.snapshot(self.started_at)
    }

    /// Resume playback; if stopped with a non-empty queue, start from the
    /// current (or first) track.
    pub async fn play(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        match state.status {
            PlaybackStatus::Playing => {}
            PlaybackStatus::Paused => state.resume(),
            PlaybackStatus::Stopped => {
                if !state.queue.is_empty() {
                    let idx = state.current.unwrap_or(0).min(state.queue.len() - 1);
                    state.start(idx);
                }
            }
        }
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    pub async fn toggle(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        match state.status {
            PlaybackStatus::Playing => state.pause(),
            PlaybackStatus::Paused => state.resume(),
            PlaybackStatus::Stopped => {
                if !state.queue.is_empty() {
                    let idx = state.current.unwrap_or(0).min(state.queue.len() - 1);
                    state.start(idx);
                }
            }
        }
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    pub async fn stop(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        state.halt();
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    /// Seek within the current track, in milliseconds.
    pub async fn seek(&self, pos_ms: u32) -> Result<StatusSnapshot, CommandError> {
        let mut state = self.state.write().await;
        let Some(track) = state.current_track() else {
            return Err(CommandError::NotPlaying);
        };
        if state.status == PlaybackStatus::Stopped {
            return Err(CommandError::NotPlaying);
        }
        let capped = u64::from(pos_ms).min(track.duration_ms);
        state.position_ms = capped;
        if state.status == PlaybackStatus::Playing {
            state.resumed_at = Some(Instant::now());
        }
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        Ok(snap)
    }

    pub async fn next(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        match state.next_index() {
            Some(idx) => state.start(idx),
            None => state.halt(),
        }
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    pub async fn prev(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        match state.current {
            Some(i) if i > 0 => state.start(i - 1),
            Some(i) => state.start(i),
            None if !state.queue.is_empty() => state.start(0),
            None => state.halt(),
        }
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    /// Jump to an absolute queue position.
    pub async fn goto(&self, idx: u32) -> Result<StatusSnapshot, CommandError> {
        let mut state = self.state.write().await;
        if (idx as usize) >= state.queue.len() {
            return Err(CommandError::BadQueueIndex(idx));
        }
        state.start(idx as usize);
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        Ok(snap)
    }

    pub async fn toggle_repeat(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        state.repeat = !state.repeat;
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    pub async fn toggle_shuffle(&self) -> StatusSnapshot {
        let mut state = self.state.write().await;
        state.shuffle = !state.shuffle;
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    pub async fn queue_snapshot(&self) -> (Vec<Track>, Option<usize>) {
        let state = self.state.read().await;
        (state.queue.clone(), state.current)
    }

    /// Empty the queue and stop playback. Returns the number of tracks
    /// removed.
    pub async fn queue_clear(&self) -> usize {
        let mut state = self.state.write().await;
        let removed = state.queue.len();
        state.queue.clear();
        state.current = None;
        state.halt();
        drop(state);
        self.touch();
        removed
    }

    /// Remove one queue entry. The current index is adjusted so the playing
    /// track keeps playing unless it was the one removed.
    pub async fn queue_remove(&self, idx: u32) -> Result<Track, CommandError> {
        let mut state = self.state.write().await;
        let i = idx as usize;
        if i >= state.queue.len() {
            return Err(CommandError::BadQueueIndex(idx));
        }
        let removed = state.queue.remove(i);
        state.current = match state.current {
            Some(cur) if cur == i => {
                state.halt();
                if state.queue.is_empty() { None } else { Some(cur.min(state.queue.len() - 1)) }
            }
            Some(cur) if cur > i => Some(cur - 1),
            other => other,
        };
        let track = removed;
        drop(state);
        self.touch();
        Ok(track)
    }

    /// Remove the inclusive range `first..=last` from the queue.
    pub async fn queue_remove_range(&self, first: u32, last: u32) -> Result<usize, CommandError> {
        let mut state = self.state.write().await;
        let (a, b) = (first as usize, last as usize);
        if a > b || b >= state.queue.len() {
            return Err(CommandError::BadQueueRange(first, last));
        }
        state.queue.drain(a..=b);
        state.current = match state.current {
            Some(cur) if cur >= a && cur <= b => {
                state.halt();
                if state.queue.is_empty() { None } else { Some(a.min(state.queue.len() - 1)) }
            }
            Some(cur) if cur > b => Some(cur - (b - a + 1)),
            other => other,
        };
        let removed = b - a + 1;
        drop(state);
        self.touch();
        Ok(removed)
    }

    /// Append a playlist's tracks to the queue. Returns how many were added.
    pub async fn enqueue_playlist(&self, idx: u32) -> Result<usize, CommandError> {
        let tracks = self
            .library
            .playlist(idx)
            .ok_or(CommandError::UnknownPlaylist(idx))?
            .tracks
            .clone();
        Ok(self.enqueue(tracks).await)
    }

    /// Append a single playlist track to the queue.
    pub async fn enqueue_track(&self, pl: u32, tr: u32) -> Result<Track, CommandError> {
        let track = self.playlist_track(pl, tr)?;
        self.enqueue(vec![track.clone()]).await;
        Ok(track)
    }

    /// Replace the queue with a playlist and start playing it.
    pub async fn play_playlist(&self, idx: u32) -> Result<StatusSnapshot, CommandError> {
        let tracks = self
            .library
            .playlist(idx)
            .ok_or(CommandError::UnknownPlaylist(idx))?
            .tracks
            .clone();
        Ok(self.play_now(tracks).await)
    }

    /// Replace the queue with a single playlist track and play it.
    pub async fn play_track(&self, pl: u32, tr: u32) -> Result<StatusSnapshot, CommandError> {
        let track = self.playlist_track(pl, tr)?;
        Ok(self.play_now(vec![track]).await)
    }

    /// Append tracks to the queue. Returns how many were added.
    pub async fn enqueue(&self, tracks: Vec<Track>) -> usize {
        let added = tracks.len();
        if added > 0 {
            let mut state = self.state.write().await;
            state.queue.extend(tracks);
            drop(state);
            self.touch();
        }
        added
    }

    /// Replace the queue and start playback from the first new track.
    pub async fn play_now(&self, tracks: Vec<Track>) -> StatusSnapshot {
        let mut state = self.state.write().await;
        state.queue = tracks;
        if state.queue.is_empty() {
            state.current = None;
            state.halt();
        } else {
            state.start(0);
        }
        let snap = state.snapshot(self.started_at);
        drop(state);
        self.touch();
        snap
    }

    fn playlist_track(&self, pl: u32, tr: u32) -> Result<Track, CommandError> {
        let playlist = self.library.playlist(pl).ok_or(CommandError::UnknownPlaylist(pl))?;
        playlist
            .tracks
            .get(tr as usize)
            .cloned()
            .ok_or(CommandError::UnknownTrack(pl, tr))
    }

    // ------------------------------------------------------------------
    // Links and search
    // ------------------------------------------------------------------

    /// Materialize a link into its tracks. An empty result is reported as an
    /// unknown resource.
    pub fn resolve_link(&self, link: &Link) -> Result<Vec<Track>, CommandError> {
        let tracks = match link {
            Link::Track(id) => self.library.track_by_id(id).cloned().into_iter().collect(),
            Link::Playlist(idx) => self
                .library
                .playlist(*idx)
                .map(|pl| pl.tracks.clone())
                .unwrap_or_default(),
            Link::Album(name) => self.library.tracks_where(|t| t.album.eq_ignore_ascii_case(name)),
            Link::Artist(name) => self.library.tracks_where(|t| t.artist.eq_ignore_ascii_case(name)),
        };
        if tracks.is_empty() {
            return Err(CommandError::UnknownResource(link.to_string()));
        }
        Ok(tracks)
    }

    /// Case-insensitive substring search over title, artist, and album.
    pub fn search(&self, query: &str) -> Vec<Track> {
        let needle = query.to_lowercase();
        self.library.tracks_where(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.artist.to_lowercase().contains(&needle)
                || t.album.to_lowercase().contains(&needle)
        })
    }
}
