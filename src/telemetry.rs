//! Telemetry utilities for command timing and request correlation.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors for request observability.
pub mod spans {
    use tracing::{Span, info_span};
    use uuid::Uuid;

    /// Create a span for one bridge request.
    pub fn request(transport: &str, id: Uuid) -> Span {
        info_span!("request", transport = %transport, id = %id)
    }

    /// Create a span for a gateway client connection.
    pub fn client(id: Uuid, addr: &std::net::SocketAddr) -> Span {
        info_span!("client", id = %id, addr = %addr)
    }
}
