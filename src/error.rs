//! Unified error handling for spind.
//!
//! Routing-stage errors and operation-stage errors are kept strictly apart:
//! a `DispatchError` is resolved by the dispatcher or a transport adapter
//! before any operation runs, while a `CommandError` is produced by an
//! operation and travels back through its completion channel.

use thiserror::Error;

// ============================================================================
// Dispatch Errors (routing stage)
// ============================================================================

/// Errors raised while routing a request to a catalogue entry.
///
/// Operation code never sees these; each maps to a terminal, bodyless
/// transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Empty request, or no catalogue entry matches name and arity.
    #[error("no such command")]
    NotFound,

    /// A segment failed percent-decoding, or an argument did not parse
    /// against its declared kind.
    #[error("malformed command argument")]
    BadRequest,

    /// The entry exists but cannot be invoked through direct dispatch.
    #[error("command not available on this transport")]
    Forbidden,
}

impl DispatchError {
    /// Static label for metrics.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Forbidden => "forbidden",
        }
    }
}

// ============================================================================
// Command Errors (operation stage)
// ============================================================================

/// Domain failures reported by operations after argument binding succeeded.
///
/// These are delivered through the completion channel as a failure reply;
/// the dispatcher does not inspect or reinterpret them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no playlist at index {0}")]
    UnknownPlaylist(u32),

    #[error("no track at index {1} in playlist {0}")]
    UnknownTrack(u32, u32),

    #[error("no queue entry at index {0}")]
    BadQueueIndex(u32),

    #[error("invalid queue range {0} {1}")]
    BadQueueRange(u32, u32),

    #[error("nothing is playing")]
    NotPlaying,

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl CommandError {
    /// Static label for metrics.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPlaylist(_) => "unknown_playlist",
            Self::UnknownTrack(_, _) => "unknown_track",
            Self::BadQueueIndex(_) => "bad_queue_index",
            Self::BadQueueRange(_, _) => "bad_queue_range",
            Self::NotPlaying => "not_playing",
            Self::UnknownResource(_) => "unknown_resource",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_codes() {
        assert_eq!(DispatchError::NotFound.error_code(), "not_found");
        assert_eq!(DispatchError::BadRequest.error_code(), "bad_request");
        assert_eq!(DispatchError::Forbidden.error_code(), "forbidden");
    }

    #[test]
    fn test_command_error_codes() {
        assert_eq!(CommandError::UnknownPlaylist(3).error_code(), "unknown_playlist");
        assert_eq!(CommandError::NotPlaying.error_code(), "not_playing");
        assert_eq!(CommandError::Internal("test").error_code(), "internal_error");
    }
}
