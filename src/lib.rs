//! # Trellis
//!
//! **Trellis** is an embeddable, coroutine-powered HTTP request router for
//! Rust: route groups, cursor-driven middleware chains, path parameters and
//! wildcards, and static file serving on top of the `may` runtime.
//!
//! ## Overview
//!
//! Routes are registered through an [`Engine`] and its [`Group`]s during a
//! single-threaded startup phase; constructing the serving service freezes
//! the table, so a running server resolves against an immutable snapshot.
//! Matching is segment-based over a per-method tree with literal segments
//! winning over `:param` segments, which win over a trailing `*wildcard`.
//!
//! ## Architecture
//!
//! - **[`router`]** - Pattern parsing, the per-method match tree, and route
//!   resolution
//! - **[`group`]** - The engine and group builders (base paths, inherited
//!   middleware, static mounts)
//! - **[`context`]** - The per-request [`Context`] handed through a chain
//! - **[`chain`]** - Handler and chain type aliases
//! - **[`middleware`]** - Ready-made logging and metrics middleware
//! - **[`server`]** - HTTP front end built on `may_minihttp`
//! - **[`static_files`]** - Filesystem-backed asset serving
//!
//! ## Example
//!
//! ```
//! use trellis::{handler_fn, Engine};
//!
//! let mut engine = Engine::new();
//! engine.use_middleware(handler_fn(|ctx| {
//!     // runs before the handler; next() hands control downstream
//!     ctx.next();
//! }));
//!
//! let v1 = engine.group("/v1");
//! v1.get("/users/:id", vec![handler_fn(|ctx| {
//!     let id = ctx.param("id").to_string();
//!     ctx.string(200, &format!("user {id}"));
//! })]).unwrap();
//! ```

pub mod chain;
pub mod cli;
pub mod context;
pub mod error;
pub mod group;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use chain::{handler_fn, Handler, HandlersChain};
pub use context::{Context, RequestParts, ResponseParts};
pub use error::RegistrationError;
pub use group::{Engine, Group};
pub use router::{
    ParamVec, RouteMatch, RouteResolution, Router, RouterConfig, MAX_INLINE_PARAMS,
};
pub use runtime_config::RuntimeConfig;
