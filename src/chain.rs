//! Handler and chain type aliases.
//!
//! A chain is an ordered sequence of handler units; by convention the final
//! unit is the "real" handler and the preceding ones are middleware. Chains
//! are plain `Vec`s while a group is accumulating them and are frozen into
//! `Arc<[Handler]>` when the route is written into the table, so the sequence
//! a request executes can never mutate mid-flight.

use crate::context::Context;
use std::sync::Arc;

/// A single handler unit. Middleware and final handlers share this shape;
/// a middleware cooperates by calling [`Context::next`], a final handler
/// usually just writes a response.
pub type Handler = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

/// An ordered handler chain as accumulated during registration.
pub type HandlersChain = Vec<Handler>;

/// Wrap a closure as a [`Handler`].
///
/// ```
/// use trellis::handler_fn;
///
/// let hello = handler_fn(|ctx| ctx.string(200, "hello"));
/// ```
pub fn handler_fn<F>(f: F) -> Handler
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}
