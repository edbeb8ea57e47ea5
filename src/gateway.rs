//! Line-oriented TCP control gateway.
//!
//! The peer transport to the HTTP bridge: clients hold a persistent
//! connection, send one whitespace-separated command per line, and receive
//! one JSON document per line in return. The gateway services `bye`/`quit`
//! and `idle` natively (`idle` suspends on the session's change channel
//! and answers with the player status once something happens) and routes
//! everything else through the same dispatcher as the bridge. Having no
//! status codes, this transport reports routing errors as `{"error": ...}`
//! documents.

use crate::dispatch::{Completion, Dispatcher, Request};
use crate::metrics;
use crate::telemetry::spans;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{Instrument, debug, info};
use uuid::Uuid;

/// Flood guard for a single command line.
const MAX_LINE_LENGTH: usize = 512;

/// The gateway accepts incoming TCP connections and serves each on its own
/// task.
pub struct Gateway {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Gateway listening");
        Ok(Self { listener, dispatcher })
    }

    /// Address actually bound (useful when configured with port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the process exits.
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let dispatcher = Arc::clone(&self.dispatcher);
            let id = Uuid::new_v4();
            tokio::spawn(async move {
                metrics::gateway_client_connected();
                let result = serve_client(stream, dispatcher)
                    .instrument(spans::client(id, &addr))
                    .await;
                metrics::gateway_client_disconnected();
                if let Err(e) = result {
                    debug!(client = %id, error = %e, "client connection ended with error");
                }
            });
        }
    }
}

async fn serve_client(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    framed.send(format!("spind {}", env!("CARGO_PKG_VERSION"))).await?;

    while let Some(line) = framed.next().await {
        let line = line?;
        let request = Request::from_line(&line);
        let Some(name) = request.name() else {
            continue;
        };
        debug!(command = %name, "gateway line");

        match name {
            "bye" | "quit" => {
                framed.send(json!({ "status": "bye" }).to_string()).await?;
                break;
            }
            "idle" => {
                // Suspend until the session changes, then report the new
                // player state. No timeout: the client owns its patience.
                let mut changes = dispatcher.session().subscribe();
                if changes.changed().await.is_err() {
                    break;
                }
                let reply = run_command(&dispatcher, &Request::from_line("status")).await;
                framed.send(reply.to_string()).await?;
            }
            _ => {
                let reply = run_command(&dispatcher, &request).await;
                framed.send(reply.to_string()).await?;
            }
        }
    }

    debug!("client disconnected");
    Ok(())
}

/// Dispatch one request and wait for its reply, folding every failure mode
/// into a one-line JSON document.
async fn run_command(dispatcher: &Dispatcher, request: &Request) -> Value {
    let (completion, receiver) = Completion::channel();
    match dispatcher.dispatch(request, completion) {
        Err(e) => json!({ "error": e.to_string() }),
        Ok(()) => match receiver.await {
            Ok(Ok(Value::Null)) => json!({ "status": "ok" }),
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => json!({ "error": e.to_string() }),
            Err(_) => json!({ "error": "operation failed to complete" }),
        },
    }
}
