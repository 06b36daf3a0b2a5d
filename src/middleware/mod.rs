//! Ready-made middleware built on the chain cursor.
//!
//! Middleware here are ordinary [`Handler`](crate::Handler) units: they run
//! code, call [`Context::next`](crate::Context::next) to hand control
//! downstream, and run more code once the downstream units return.

mod logger;
mod metrics;

pub use logger::logger;
pub use metrics::Metrics;
