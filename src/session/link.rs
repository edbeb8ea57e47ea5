//! Resource links: opaque references to library resources.
//!
//! Wire form is `<kind>:<id>`, e.g. `track:9f31ab`, `playlist:2`,
//! `album:Remain in Light`. Links are the session's addressing scheme for
//! anything that is not a positional index.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to parse a resource link from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkParseError {
    #[error("missing ':' separator in link")]
    MissingSeparator,

    #[error("unknown link kind: {0}")]
    UnknownKind(String),

    #[error("empty link id")]
    EmptyId,

    #[error("playlist link id must be a number: {0}")]
    BadPlaylistIndex(String),
}

/// A reference to a resource the session knows how to materialize into
/// tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// A single track, by library id.
    Track(String),
    /// A playlist, by library position.
    Playlist(u32),
    /// All tracks sharing an album name.
    Album(String),
    /// All tracks sharing an artist name.
    Artist(String),
}

impl Link {
    /// The kind tag used in the wire form.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Track(_) => "track",
            Self::Playlist(_) => "playlist",
            Self::Album(_) => "album",
            Self::Artist(_) => "artist",
        }
    }
}

impl FromStr for Link {
    type Err = LinkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or(LinkParseError::MissingSeparator)?;
        if id.is_empty() {
            return Err(LinkParseError::EmptyId);
        }
        match kind {
            "track" => Ok(Self::Track(id.to_owned())),
            "playlist" => id
                .parse::<u32>()
                .map(Self::Playlist)
                .map_err(|_| LinkParseError::BadPlaylistIndex(id.to_owned())),
            "album" => Ok(Self::Album(id.to_owned())),
            "artist" => Ok(Self::Artist(id.to_owned())),
            other => Err(LinkParseError::UnknownKind(other.to_owned())),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Track(id) => write!(f, "track:{id}"),
            Self::Playlist(idx) => write!(f, "playlist:{idx}"),
            Self::Album(name) => write!(f, "album:{name}"),
            Self::Artist(name) => write!(f, "artist:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_link() {
        assert_eq!("track:9f31".parse(), Ok(Link::Track("9f31".into())));
    }

    #[test]
    fn test_parse_playlist_link() {
        assert_eq!("playlist:2".parse(), Ok(Link::Playlist(2)));
        assert_eq!(
            "playlist:two".parse::<Link>(),
            Err(LinkParseError::BadPlaylistIndex("two".into()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("justaword".parse::<Link>(), Err(LinkParseError::MissingSeparator));
        assert_eq!("track:".parse::<Link>(), Err(LinkParseError::EmptyId));
        assert_eq!(
            "video:abc".parse::<Link>(),
            Err(LinkParseError::UnknownKind("video".into()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["track:9f31", "playlist:0", "album:Low", "artist:Eno"] {
            let link: Link = raw.parse().unwrap();
            assert_eq!(link.to_string(), raw);
        }
    }
}
