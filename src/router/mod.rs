//! # Router Module
//!
//! Path matching and route resolution. Registered patterns are decomposed
//! into typed segments (literal, `:param`, `*wildcard`) at startup and stored
//! in a per-method segment tree, so request-time matching is a tree walk with
//! no string re-parsing.
//!
//! ## Two-phase approach
//!
//! 1. **Registration**: [`Pattern::parse`] validates the pattern shape and
//!    [`Router::add_route`] inserts the frozen handler chain into the tree.
//!    Every structural error is reported here, never at request time.
//! 2. **Resolution**: [`Router::resolve`] walks the tree for the request
//!    method, extracting parameter bindings as it goes. Literal segments win
//!    over parameters, parameters over wildcards, leftmost segment first.
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use trellis::handler_fn;
//! use trellis::router::{Router, RouteResolution};
//!
//! let mut router = Router::default();
//! router
//!     .add_route(Method::GET, "/hello/:name", vec![handler_fn(|_| {})])
//!     .unwrap();
//!
//! match router.resolve(&Method::GET, "/hello/world") {
//!     RouteResolution::Matched(m) => assert_eq!(m.params[0].1, "world"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

mod core;
mod pattern;
mod tree;

pub use core::{
    ParamVec, RouteMatch, RouteResolution, Router, RouterConfig, MAX_INLINE_PARAMS,
};
pub use pattern::{Pattern, Segment};
