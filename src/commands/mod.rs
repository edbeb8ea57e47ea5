//! The command catalogue: descriptors, signatures, and argument resolution.
//!
//! Every operation the daemon exposes lives in one fixed table built by
//! [`catalogue`]. A [`Descriptor`] pairs a command name with an
//! [`Invocation`]; the `Operation` variant inside a runnable invocation pins
//! the argument signature, so a descriptor's declared kinds and its callable
//! can never disagree. Lookup is by `(name, arity)`: the same name may
//! appear at several arities, and declaration order breaks ties.

mod links;
mod playback;
mod playlists;
mod queue;

use crate::error::CommandError;
use crate::session::{Link, Session, StatusSnapshot, Track};
use futures_util::future::BoxFuture;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

/// Most arguments any command declares.
pub const MAX_ARGS: usize = 2;

/// JSON document produced by a completed operation.
pub type Payload = Value;

/// What an operation resolves to.
pub type CommandResult = Result<Payload, CommandError>;

/// Boxed future returned by every operation callable.
pub type OpFuture = BoxFuture<'static, CommandResult>;

/// Kinds of arguments a command can declare (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Base-10 non-negative integer.
    Index,
    /// Free text, taken verbatim.
    Text,
    /// A resource link the session understands.
    Link,
}

impl ArgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Text => "text",
            Self::Link => "link",
        }
    }
}

/// One argument after validation against its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Index(u32),
    Text(String),
    Link(Link),
}

type SimpleFn = fn(Arc<Session>) -> OpFuture;
type IndexFn = fn(Arc<Session>, u32) -> OpFuture;
type PairFn = fn(Arc<Session>, u32, u32) -> OpFuture;
type TextFn = fn(Arc<Session>, String) -> OpFuture;
type LinkFn = fn(Arc<Session>, Link) -> OpFuture;

/// A callable operation. The variant *is* the signature: argument kinds and
/// arity are derived from it, never declared separately.
#[derive(Clone, Copy)]
pub enum Operation {
    Simple(SimpleFn),
    Index(IndexFn),
    Pair(PairFn),
    Text(TextFn),
    Link(LinkFn),
}

impl Operation {
    /// Declared argument kinds, in call order.
    pub fn arg_kinds(&self) -> &'static [ArgKind] {
        match self {
            Self::Simple(_) => &[],
            Self::Index(_) => &[ArgKind::Index],
            Self::Pair(_) => &[ArgKind::Index, ArgKind::Index],
            Self::Text(_) => &[ArgKind::Text],
            Self::Link(_) => &[ArgKind::Link],
        }
    }

    pub fn arity(&self) -> usize {
        self.arg_kinds().len()
    }

    /// Invoke with arguments previously resolved against `arg_kinds()`.
    pub(crate) fn call(&self, session: Arc<Session>, args: Vec<ArgValue>) -> OpFuture {
        match (self, args.as_slice()) {
            (Self::Simple(f), []) => f(session),
            (Self::Index(f), [ArgValue::Index(n)]) => f(session, *n),
            (Self::Pair(f), [ArgValue::Index(a), ArgValue::Index(b)]) => f(session, *a, *b),
            (Self::Text(f), [ArgValue::Text(s)]) => f(session, s.clone()),
            (Self::Link(f), [ArgValue::Link(l)]) => f(session, l.clone()),
            // resolve() binds against arg_kinds(), so the shapes always line up
            _ => Box::pin(async { Err(CommandError::Internal("argument shape mismatch")) }),
        }
    }
}

/// How a catalogue entry is executed when addressed directly.
pub enum Invocation {
    /// Dispatch runs the operation.
    Run(Operation),
    /// Acknowledged with an empty payload; no operation is invoked. Used for
    /// commands another transport services natively (`idle`).
    Idle,
    /// Recognized but reserved for the line gateway (`bye`, `quit`).
    Gated,
}

/// One entry of the command catalogue.
pub struct Descriptor {
    pub name: &'static str,
    pub invocation: Invocation,
}

impl Descriptor {
    /// Number of argument segments this entry consumes.
    pub fn arity(&self) -> usize {
        match &self.invocation {
            Invocation::Run(op) => op.arity(),
            Invocation::Idle | Invocation::Gated => 0,
        }
    }
}

/// The fixed, ordered catalogue. Closed after construction; no runtime
/// registration.
pub struct Registry {
    entries: Vec<Descriptor>,
}

impl Registry {
    pub fn new(entries: Vec<Descriptor>) -> Self {
        Self { entries }
    }

    /// First entry matching `name` exactly with the given argument count,
    /// scanning in declaration order.
    pub fn lookup(&self, name: &str, arity: usize) -> Option<&Descriptor> {
        if arity > MAX_ARGS {
            return None;
        }
        self.entries
            .iter()
            .find(|d| d.name == name && d.arity() == arity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Why argument resolution rejected a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("argument {position} ({segment:?}) is not a valid {}", .kind.as_str())]
pub struct ResolveError {
    pub position: usize,
    pub segment: String,
    pub kind: ArgKind,
}

/// Validate raw segments against declared kinds, in order. All-or-nothing:
/// the first failure rejects the whole request, before any operation runs.
/// Segments arrive already percent-decoded.
pub fn resolve(segments: &[String], kinds: &'static [ArgKind]) -> Result<Vec<ArgValue>, ResolveError> {
    debug_assert_eq!(segments.len(), kinds.len());
    kinds
        .iter()
        .zip(segments)
        .enumerate()
        .map(|(position, (kind, segment))| {
            let value = match kind {
                ArgKind::Index => segment.parse::<u32>().ok().map(ArgValue::Index),
                ArgKind::Text => Some(ArgValue::Text(segment.clone())),
                ArgKind::Link => segment.parse::<Link>().ok().map(ArgValue::Link),
            };
            value.ok_or_else(|| ResolveError {
                position,
                segment: segment.clone(),
                kind: *kind,
            })
        })
        .collect()
}

/// The daemon's command catalogue. Shared by every transport; built once at
/// startup and handed to the dispatcher.
pub fn catalogue() -> Registry {
    use Invocation::{Gated, Idle, Run};
    use Operation as Op;

    Registry::new(vec![
        // Playlists
        Descriptor { name: "ls", invocation: Run(Op::Simple(playlists::list_playlists)) },
        Descriptor { name: "ls", invocation: Run(Op::Index(playlists::list_tracks)) },
        Descriptor { name: "search", invocation: Run(Op::Text(playlists::search)) },
        // Player status and modes
        Descriptor { name: "status", invocation: Run(Op::Simple(playback::status)) },
        Descriptor { name: "repeat", invocation: Run(Op::Simple(playback::repeat)) },
        Descriptor { name: "shuffle", invocation: Run(Op::Simple(playback::shuffle)) },
        // Queue
        Descriptor { name: "qls", invocation: Run(Op::Simple(queue::queue_list)) },
        Descriptor { name: "qclear", invocation: Run(Op::Simple(queue::queue_clear)) },
        Descriptor { name: "qrm", invocation: Run(Op::Index(queue::queue_remove)) },
        Descriptor { name: "qrm", invocation: Run(Op::Pair(queue::queue_remove_range)) },
        Descriptor { name: "add", invocation: Run(Op::Index(queue::add_playlist)) },
        Descriptor { name: "add", invocation: Run(Op::Pair(queue::add_track)) },
        // Transport; "play" is overloaded at arities 0, 1, and 2
        Descriptor { name: "play", invocation: Run(Op::Simple(playback::play)) },
        Descriptor { name: "play", invocation: Run(Op::Index(queue::play_playlist)) },
        Descriptor { name: "play", invocation: Run(Op::Pair(queue::play_track)) },
        Descriptor { name: "toggle", invocation: Run(Op::Simple(playback::toggle)) },
        Descriptor { name: "stop", invocation: Run(Op::Simple(playback::stop)) },
        Descriptor { name: "seek", invocation: Run(Op::Index(playback::seek)) },
        Descriptor { name: "next", invocation: Run(Op::Simple(playback::next)) },
        Descriptor { name: "prev", invocation: Run(Op::Simple(playback::prev)) },
        Descriptor { name: "goto", invocation: Run(Op::Index(playback::goto)) },
        // Links
        Descriptor { name: "uinfo", invocation: Run(Op::Link(links::link_info)) },
        Descriptor { name: "uadd", invocation: Run(Op::Link(links::link_add)) },
        Descriptor { name: "uplay", invocation: Run(Op::Link(links::link_play)) },
        // Serviced natively by the line gateway
        Descriptor { name: "idle", invocation: Idle },
        Descriptor { name: "bye", invocation: Gated },
        Descriptor { name: "quit", invocation: Gated },
    ])
}

// ----------------------------------------------------------------------
// Shared payload shaping
// ----------------------------------------------------------------------

pub(crate) fn track_payload(track: &Track) -> Value {
    json!({
        "id": track.id,
        "title": track.title,
        "artist": track.artist,
        "album": track.album,
        "duration_ms": track.duration_ms,
    })
}

pub(crate) fn status_payload(snap: &StatusSnapshot) -> Value {
    let mut doc = json!({
        "status": snap.status.as_str(),
        "repeat": snap.repeat,
        "shuffle": snap.shuffle,
        "total_tracks": snap.queue_len,
        "since": snap.since.to_rfc3339(),
    });
    if let (Some(current), Some(track)) = (snap.current, snap.track.as_ref()) {
        doc["current_track"] = json!(current + 1);
        doc["artist"] = json!(track.artist);
        doc["title"] = json!(track.title);
        doc["album"] = json!(track.album);
        doc["duration_ms"] = json!(track.duration_ms);
        doc["position_ms"] = json!(snap.position_ms);
        doc["uri"] = json!(format!("track:{}", track.id));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Library;

    fn noop(_: Arc<Session>) -> OpFuture {
        Box::pin(async { Ok(Value::Null) })
    }

    fn noop_index(_: Arc<Session>, _: u32) -> OpFuture {
        Box::pin(async { Ok(Value::Null) })
    }

    fn synthetic() -> Registry {
        Registry::new(vec![
            Descriptor { name: "play", invocation: Invocation::Run(Operation::Simple(noop)) },
            Descriptor { name: "play", invocation: Invocation::Run(Operation::Index(noop_index)) },
            Descriptor { name: "halt", invocation: Invocation::Gated },
        ])
    }

    #[test]
    fn test_lookup_matches_name_and_arity() {
        let registry = synthetic();
        let zero = registry.lookup("play", 0).unwrap();
        assert!(matches!(&zero.invocation, Invocation::Run(Operation::Simple(_))));
        let one = registry.lookup("play", 1).unwrap();
        assert!(matches!(&one.invocation, Invocation::Run(Operation::Index(_))));
    }

    #[test]
    fn test_lookup_misses_on_wrong_arity() {
        let registry = synthetic();
        assert!(registry.lookup("play", 2).is_none());
        assert!(registry.lookup("halt", 1).is_none());
        assert!(registry.lookup("nope", 0).is_none());
        assert!(registry.lookup("play", MAX_ARGS + 1).is_none());
    }

    #[tokio::test]
    async fn test_lookup_prefers_declaration_order() {
        // Two entries with the same (name, arity): first declared wins.
        fn first(_: Arc<Session>) -> OpFuture {
            Box::pin(async { Ok(json!("first")) })
        }
        fn second(_: Arc<Session>) -> OpFuture {
            Box::pin(async { Ok(json!("second")) })
        }
        let registry = Registry::new(vec![
            Descriptor { name: "x", invocation: Invocation::Run(Operation::Simple(first)) },
            Descriptor { name: "x", invocation: Invocation::Run(Operation::Simple(second)) },
        ]);
        let session = Arc::new(Session::new(Library::default()));
        let Invocation::Run(op) = &registry.lookup("x", 0).unwrap().invocation else {
            panic!("wrong invocation");
        };
        assert_eq!(op.call(session, Vec::new()).await.unwrap(), json!("first"));
    }

    #[test]
    fn test_resolve_preserves_order() {
        let segments = vec!["3".to_string(), "7".to_string()];
        let kinds: &'static [ArgKind] = &[ArgKind::Index, ArgKind::Index];
        let args = resolve(&segments, kinds).unwrap();
        assert_eq!(args, vec![ArgValue::Index(3), ArgValue::Index(7)]);
    }

    #[test]
    fn test_resolve_rejects_bad_integer() {
        let segments = vec!["notanumber".to_string()];
        let err = resolve(&segments, &[ArgKind::Index]).unwrap_err();
        assert_eq!(err.position, 0);
        assert_eq!(err.kind, ArgKind::Index);
    }

    #[test]
    fn test_resolve_rejects_negative_integer() {
        let segments = vec!["-1".to_string()];
        assert!(resolve(&segments, &[ArgKind::Index]).is_err());
    }

    #[test]
    fn test_resolve_rejects_bad_link() {
        let segments = vec!["noseparator".to_string()];
        assert!(resolve(&segments, &[ArgKind::Link]).is_err());
    }

    #[test]
    fn test_resolve_is_all_or_nothing() {
        // First segment valid, second invalid: whole request rejected.
        let segments = vec!["3".to_string(), "x".to_string()];
        let kinds: &'static [ArgKind] = &[ArgKind::Index, ArgKind::Index];
        let err = resolve(&segments, kinds).unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_catalogue_is_internally_consistent() {
        let registry = catalogue();
        assert!(!registry.is_empty());
        // Overloads reachable at each declared arity
        assert!(registry.lookup("play", 0).is_some());
        assert!(registry.lookup("play", 1).is_some());
        assert!(registry.lookup("play", 2).is_some());
        assert!(registry.lookup("ls", 0).is_some());
        assert!(registry.lookup("ls", 1).is_some());
        assert!(registry.lookup("qrm", 2).is_some());
        // Gated and idle entries are present at arity 0
        assert!(matches!(&registry.lookup("bye", 0).unwrap().invocation, Invocation::Gated));
        assert!(matches!(&registry.lookup("idle", 0).unwrap().invocation, Invocation::Idle));
    }

    #[tokio::test]
    async fn test_operation_call_binds_resolved_args() {
        fn double(_: Arc<Session>, n: u32) -> OpFuture {
            Box::pin(async move { Ok(json!(n * 2)) })
        }
        let session = Arc::new(Session::new(Library::default()));
        let op = Operation::Index(double);
        let args = resolve(&["21".to_string()], op.arg_kinds()).unwrap();
        let payload = op.call(session, args).await.unwrap();
        assert_eq!(payload, json!(42));
    }
}
