//! Request routing and the completion contract.
//!
//! A [`Request`] is a transport-independent list of segments: the command
//! name followed by its raw arguments. The [`Dispatcher`] matches it against
//! the catalogue by `(name, arity)`, resolves arguments, and invokes the
//! operation on its own task; it never blocks on the operation itself.
//! Results travel back through a [`Completion`], a single-use handle the
//! requesting transport parks on.

use crate::commands::{Invocation, Registry, resolve};
use crate::error::{CommandError, DispatchError};
use crate::metrics;
use crate::session::Session;
use crate::telemetry::CommandTimer;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of a completed operation: a JSON payload, or the domain failure
/// the operation reported.
pub type Reply = Result<Value, CommandError>;

/// Single-use handle delivering one reply to whichever transport parked on
/// it. Consuming `self` makes a second delivery unrepresentable.
pub struct Completion {
    tx: oneshot::Sender<Reply>,
}

impl Completion {
    /// Create a completion and the receiver its reply will arrive on.
    pub fn channel() -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Deliver the reply. If the requester has already gone away the reply
    /// is dropped.
    pub fn complete(self, reply: Reply) {
        if self.tx.send(reply).is_err() {
            debug!("requester gone before completion");
        }
    }
}

/// A routed request: the command name followed by raw argument segments,
/// each percent-decoded exactly once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    segments: Vec<String>,
}

impl Request {
    /// Build from an HTTP-style path remainder, e.g. `uplay/track%3A9f31`.
    /// Splits on `/` and percent-decodes each segment; a segment that does
    /// not decode to UTF-8 rejects the request.
    pub fn from_path(target: &str) -> Result<Self, DispatchError> {
        if target.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }
        let segments = target
            .split('/')
            .map(|seg| percent_decode_str(seg).decode_utf8().map(|s| s.into_owned()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DispatchError::BadRequest)?;
        Ok(Self { segments })
    }

    /// Build from one line of the control gateway, e.g. `qrm 2 5`. That
    /// transport's addressing is whitespace-separated and carries no
    /// percent-encoding.
    pub fn from_line(line: &str) -> Self {
        Self {
            segments: line.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// The command name, if any segment is present.
    pub fn name(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Number of argument segments following the name.
    pub fn arity(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    fn args(&self) -> &[String] {
        self.segments.get(1..).unwrap_or_default()
    }
}

/// Routes requests to catalogue entries and manages the completion
/// contract. Holds the catalogue by value: tests construct dispatchers over
/// synthetic registries.
pub struct Dispatcher {
    registry: Registry,
    session: Arc<Session>,
}

impl Dispatcher {
    pub fn new(registry: Registry, session: Arc<Session>) -> Self {
        Self { registry, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Route one request.
    ///
    /// On `Ok(())` exactly one reply will arrive through `completion`, now
    /// or later; the call itself returns as soon as the operation is
    /// spawned. On `Err` nothing was invoked and no reply is sent; the
    /// error is terminal for this request.
    pub fn dispatch(&self, request: &Request, completion: Completion) -> Result<(), DispatchError> {
        self.route(request, completion).inspect_err(|e| {
            metrics::record_rejection(e.error_code());
        })
    }

    fn route(&self, request: &Request, completion: Completion) -> Result<(), DispatchError> {
        let Some(name) = request.name() else {
            return Err(DispatchError::NotFound);
        };
        let arity = request.arity();
        let Some(descriptor) = self.registry.lookup(name, arity) else {
            debug!(command = %name, arity, "no matching command");
            return Err(DispatchError::NotFound);
        };

        match &descriptor.invocation {
            Invocation::Idle => {
                debug!(command = %name, "idle command acknowledged");
                completion.complete(Ok(Value::Null));
                Ok(())
            }
            Invocation::Gated => Err(DispatchError::Forbidden),
            Invocation::Run(op) => {
                let args = resolve(request.args(), op.arg_kinds()).map_err(|e| {
                    debug!(command = %name, error = %e, "argument resolution failed");
                    DispatchError::BadRequest
                })?;
                debug!(command = %name, arity, "dispatching");

                let future = op.call(Arc::clone(&self.session), args);
                let timer = CommandTimer::new(descriptor.name);
                let command = descriptor.name;
                tokio::spawn(async move {
                    let reply = future.await;
                    if let Err(e) = &reply {
                        metrics::record_command_error(command, e.error_code());
                    }
                    drop(timer);
                    completion.complete(reply);
                });
                Ok(())
            }
        }
    }
}
