use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span};

use crate::chain::Handler;

/// Structured request logging middleware.
///
/// Opens a span around the downstream chain and emits one event per request
/// with the final status and latency.
pub fn logger() -> Handler {
    Arc::new(|ctx| {
        let span = info_span!(
            "request",
            method = %ctx.method(),
            path = %ctx.path(),
        );
        let _guard = span.enter();
        let start = Instant::now();
        ctx.next();
        info!(
            status = ctx.response().status,
            latency_ms = start.elapsed().as_millis() as u64,
            aborted = ctx.is_aborted(),
            "request completed"
        );
    })
}
