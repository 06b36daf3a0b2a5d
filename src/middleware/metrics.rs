use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chain::Handler;

/// Lock-free request counters.
///
/// All counters use atomic operations so a shared instance can be read from
/// any thread while requests are in flight.
pub struct Metrics {
    request_count: AtomicU64,
    total_latency_ns: AtomicU64,
    error_count: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            request_count: AtomicU64::new(0),
            total_latency_ns: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
        }
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests observed.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Number of requests that finished with a 5xx status.
    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean processing time across all observed requests, zero when none
    /// have been observed yet.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed);
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// A middleware unit recording into this instance.
    pub fn handler(self: &Arc<Self>) -> Handler {
        let metrics = Arc::clone(self);
        Arc::new(move |ctx| {
            let start = Instant::now();
            ctx.next();
            metrics.request_count.fetch_add(1, Ordering::Relaxed);
            metrics
                .total_latency_ns
                .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
            if ctx.response().status >= 500 {
                metrics.error_count.fetch_add(1, Ordering::Relaxed);
            }
        })
    }
}
