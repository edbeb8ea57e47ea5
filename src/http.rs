//! HTTP command bridge, plus the Prometheus metrics endpoint.
//!
//! The bridge exposes the catalogue as `GET /api/<command>/<arg1>/<arg2>`,
//! each segment percent-encoded independently. It translates the path into
//! a [`Request`], hands it to the [`Dispatcher`], and suspends the exchange
//! on the completion receiver until the operation finishes: no polling, no
//! connection-level pause primitives.
//!
//! Status mapping: unknown command/arity and the empty path are 404; decode
//! and argument failures are 400; gated commands are 403; non-GET methods
//! are 501 before routing. Domain failures reported by an operation arrive
//! as 200 with an `{"error": ...}` document.

use crate::dispatch::{Completion, Dispatcher, Request};
use crate::error::DispatchError;
use crate::metrics;
use crate::telemetry::spans;
use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request as HttpRequest, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Instrument, debug, error, info};
use uuid::Uuid;

/// Fixed routing prefix stripped from every bridge path.
const ROUTE_PREFIX: &str = "/api";

/// The HTTP bridge: a bound listener ready to serve the command API.
pub struct Bridge {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
}

impl Bridge {
    /// Bind the bridge to the configured address.
    pub async fn bind(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "HTTP bridge listening");
        Ok(Self { listener, dispatcher })
    }

    /// Address actually bound (useful when configured with port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the process exits.
    pub async fn run(self) -> anyhow::Result<()> {
        axum::serve(self.listener, router(self.dispatcher)).await?;
        Ok(())
    }
}

/// Build the bridge router. Separated from [`Bridge`] so tests can drive it
/// against a synthetic dispatcher.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route(ROUTE_PREFIX, any(bridge_handler))
        .route("/api/", any(bridge_handler))
        .route("/api/*target", any(bridge_handler))
        .with_state(dispatcher)
}

async fn bridge_handler(
    axum::extract::State(dispatcher): axum::extract::State<Arc<Dispatcher>>,
    req: HttpRequest<Body>,
) -> Response {
    // Method check happens before any routing.
    if req.method() != Method::GET {
        metrics::record_rejection("not_implemented");
        return StatusCode::NOT_IMPLEMENTED.into_response();
    }

    let id = Uuid::new_v4();
    // The raw (still percent-encoded) path; decoding belongs to the request
    // model and must happen exactly once.
    let path = req.uri().path().to_owned();
    let target = path
        .strip_prefix(ROUTE_PREFIX)
        .unwrap_or("")
        .trim_start_matches('/')
        .to_owned();

    async move {
        debug!(target = %target, "bridge request");

        let request = match Request::from_path(&target) {
            Ok(request) => request,
            Err(e) => {
                metrics::record_rejection(e.error_code());
                return reject(e);
            }
        };

        let (completion, receiver) = Completion::channel();
        if let Err(e) = dispatcher.dispatch(&request, completion) {
            return reject(e);
        }

        // Suspend here until the operation delivers its reply.
        match receiver.await {
            Ok(Ok(Value::Null)) => StatusCode::OK.into_response(),
            Ok(Ok(payload)) => (StatusCode::OK, Json(payload)).into_response(),
            Ok(Err(e)) => {
                debug!(error = %e, "operation reported failure");
                (StatusCode::OK, Json(json!({ "error": e.to_string() }))).into_response()
            }
            Err(_) => {
                error!("operation dropped its completion");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
    .instrument(spans::request("http", id))
    .await
}

/// Terminal routing statuses carry no body.
fn reject(e: DispatchError) -> Response {
    let status = match e {
        DispatchError::NotFound => StatusCode::NOT_FOUND,
        DispatchError::BadRequest => StatusCode::BAD_REQUEST,
        DispatchError::Forbidden => StatusCode::FORBIDDEN,
    };
    status.into_response()
}

// ============================================================================
// Metrics endpoint
// ============================================================================

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    metrics::gather_metrics()
}

/// Run the HTTP server for Prometheus metrics.
///
/// Binds to `0.0.0.0:port` and serves the `/metrics` endpoint. This is a
/// long-running task that should be spawned in the background.
pub async fn run_metrics_server(port: u16) {
    let app = Router::new().route("/metrics", get(metrics_handler));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Prometheus HTTP server listening on {}", addr);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind HTTP server on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("HTTP server error: {}", e);
    }
}
