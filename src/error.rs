//! Registration-time error taxonomy.
//!
//! Every structurally invalid route is rejected while the route table is being
//! built, during single-threaded startup. Request-time failures are limited to
//! "no match" and are never surfaced through this type.

use http::Method;
use thiserror::Error;

/// Errors reported synchronously while registering routes.
///
/// A process must not begin serving with an invalid route table; callers are
/// expected to propagate these and halt startup.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The pattern itself is malformed (misplaced wildcard, duplicate
    /// parameter name, empty segment, missing leading slash, ...).
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The exact (method, pattern) pair was already registered. Duplicate
    /// registration fails loudly rather than silently shadowing a route.
    #[error("route already registered: {method} {pattern}")]
    DuplicateRoute { method: Method, pattern: String },

    /// The pattern lands on a tree position already claimed by another
    /// registration (e.g. two wildcards with different names at one spot).
    #[error("conflicting route `{pattern}`: overlaps an existing registration")]
    ConflictingRoute { pattern: String },

    /// The combined middleware + handler chain exceeds the configured bound.
    #[error("handler chain for {method} {pattern} has {len} handlers, limit is {max}")]
    ChainTooLong {
        method: Method,
        pattern: String,
        len: usize,
        max: usize,
    },

    /// A route was registered with no handlers at all.
    #[error("route {method} {pattern} was registered with no handlers")]
    EmptyChain { method: Method, pattern: String },

    /// Static routes must be literal prefixes; `:param` and `*wildcard`
    /// markers are rejected.
    #[error("static route `{0}` must not contain `:` or `*` segments")]
    StaticPathWithMarkers(String),
}
