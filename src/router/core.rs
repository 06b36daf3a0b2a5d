//! Route table: the hot path for request resolution.

use http::Method;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pattern::{split_path, Pattern};
use super::tree::{Node, RouteEntry};
use crate::chain::{Handler, HandlersChain};
use crate::error::RegistrationError;

/// Maximum number of path parameters before heap allocation.
/// Most route patterns carry well under 8 parameters.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the match hot path.
///
/// Parameter names are `Arc<str>` because they come from the static route
/// tree and clone in O(1); values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Tuning knobs fixed before the serving phase starts.
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Upper bound on middleware + handler count per route. Exceeding it is
    /// a registration failure, keeping per-request loop cost bounded.
    pub max_chain_len: usize,
    /// When set, a path that matches only under other HTTP methods resolves
    /// to [`RouteResolution::MethodNotAllowed`] instead of a plain not-found.
    pub handle_method_not_allowed: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_chain_len: 64,
            handle_method_not_allowed: false,
        }
    }
}

/// Result of successfully resolving a request to a route.
#[derive(Clone)]
pub struct RouteMatch {
    /// Frozen handler chain for this route.
    pub chain: Arc<[Handler]>,
    /// Path parameters extracted during matching, in binding order.
    pub params: ParamVec,
    /// Pattern string the route was registered under.
    pub pattern: Arc<str>,
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .field("chain_len", &self.chain.len())
            .finish()
    }
}

/// Outcome of [`Router::resolve`]. Resolution never fails at request time;
/// the worst case is a clean not-found.
#[derive(Debug, Clone)]
pub enum RouteResolution {
    Matched(RouteMatch),
    /// The path exists under a different method (only reported when
    /// [`RouterConfig::handle_method_not_allowed`] is set).
    MethodNotAllowed,
    NotFound,
}

/// The route table: per HTTP method, a segment tree of registered routes.
///
/// All mutation happens through [`Router::add_route`] during single-threaded
/// startup; once the serving phase begins the table is held behind an `Arc`
/// snapshot and only [`Router::resolve`] is called, concurrently, from any
/// number of request coroutines.
#[derive(Clone)]
pub struct Router {
    config: RouterConfig,
    trees: HashMap<Method, Node>,
    registered: HashSet<(Method, String)>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            trees: HashMap::new(),
            registered: HashSet::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Number of registered (method, pattern) routes.
    pub fn route_count(&self) -> usize {
        self.registered.len()
    }

    /// Register a route. All structural validation happens here, at startup;
    /// malformed patterns never make it into the tree.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        chain: HandlersChain,
    ) -> Result<(), RegistrationError> {
        if chain.is_empty() {
            return Err(RegistrationError::EmptyChain {
                method,
                pattern: pattern.to_string(),
            });
        }
        if chain.len() > self.config.max_chain_len {
            return Err(RegistrationError::ChainTooLong {
                method,
                pattern: pattern.to_string(),
                len: chain.len(),
                max: self.config.max_chain_len,
            });
        }

        let parsed = Pattern::parse(pattern)?;

        let key = (method.clone(), parsed.raw().to_string());
        if self.registered.contains(&key) {
            return Err(RegistrationError::DuplicateRoute {
                method,
                pattern: pattern.to_string(),
            });
        }

        let entry = RouteEntry {
            pattern: Arc::from(parsed.raw()),
            chain: Arc::from(chain),
        };
        self.trees
            .entry(method.clone())
            .or_insert_with(Node::root)
            .insert(parsed.segments(), entry)?;
        self.registered.insert(key);

        info!(
            method = %method,
            pattern = %pattern,
            routes_total = self.registered.len(),
            "route registered"
        );
        Ok(())
    }

    /// Resolve a request to a handler chain and its parameter bindings.
    ///
    /// `path` must be percent-decoded with the query string stripped. Literal
    /// segments take priority over parameters, which take priority over
    /// wildcards, evaluated leftmost-segment-first.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResolution {
        let segments = split_path(path);

        if let Some(tree) = self.trees.get(method) {
            let mut params = ParamVec::new();
            if let Some(entry) = tree.search(&segments, &mut params) {
                debug!(
                    method = %method,
                    path = %path,
                    pattern = %entry.pattern,
                    params = ?params,
                    "route matched"
                );
                return RouteResolution::Matched(RouteMatch {
                    chain: Arc::clone(&entry.chain),
                    params,
                    pattern: Arc::clone(&entry.pattern),
                });
            }
        }

        if self.config.handle_method_not_allowed {
            for (other, tree) in &self.trees {
                if other != method && tree.would_match(&segments) {
                    debug!(method = %method, path = %path, allowed = %other, "method not allowed");
                    return RouteResolution::MethodNotAllowed;
                }
            }
        }

        warn!(method = %method, path = %path, "no route matched");
        RouteResolution::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler_fn;

    fn chain() -> HandlersChain {
        vec![handler_fn(|_| {})]
    }

    fn must_match(router: &Router, method: Method, path: &str) -> RouteMatch {
        match router.resolve(&method, path) {
            RouteResolution::Matched(m) => m,
            other => panic!("expected match for {method} {path}, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_registration_fails_loudly() {
        let mut router = Router::default();
        router.add_route(Method::GET, "/a", chain()).unwrap();
        let err = router.add_route(Method::GET, "/a", chain());
        assert!(matches!(err, Err(RegistrationError::DuplicateRoute { .. })));
        // Same pattern under another method is fine.
        router.add_route(Method::POST, "/a", chain()).unwrap();
        assert_eq!(router.route_count(), 2);
    }

    #[test]
    fn chain_bound_enforced_at_registration() {
        let mut router = Router::new(RouterConfig {
            max_chain_len: 2,
            ..RouterConfig::default()
        });
        router
            .add_route(
                Method::GET,
                "/ok",
                vec![handler_fn(|_| {}), handler_fn(|_| {})],
            )
            .unwrap();
        let err = router.add_route(
            Method::GET,
            "/too-long",
            vec![handler_fn(|_| {}), handler_fn(|_| {}), handler_fn(|_| {})],
        );
        assert!(matches!(
            err,
            Err(RegistrationError::ChainTooLong { len: 3, max: 2, .. })
        ));
    }

    #[test]
    fn empty_chain_rejected() {
        let mut router = Router::default();
        let err = router.add_route(Method::GET, "/a", Vec::new());
        assert!(matches!(err, Err(RegistrationError::EmptyChain { .. })));
    }

    #[test]
    fn method_not_allowed_is_opt_in() {
        let mut strict = Router::new(RouterConfig {
            handle_method_not_allowed: true,
            ..RouterConfig::default()
        });
        strict.add_route(Method::GET, "/thing", chain()).unwrap();
        assert!(matches!(
            strict.resolve(&Method::POST, "/thing"),
            RouteResolution::MethodNotAllowed
        ));
        assert!(matches!(
            strict.resolve(&Method::POST, "/other"),
            RouteResolution::NotFound
        ));

        let mut lax = Router::default();
        lax.add_route(Method::GET, "/thing", chain()).unwrap();
        assert!(matches!(
            lax.resolve(&Method::POST, "/thing"),
            RouteResolution::NotFound
        ));
    }

    #[test]
    fn priority_and_bindings() {
        let mut router = Router::default();
        router
            .add_route(Method::GET, "/users/admin", chain())
            .unwrap();
        router
            .add_route(Method::GET, "/users/:id", chain())
            .unwrap();

        assert_eq!(
            &*must_match(&router, Method::GET, "/users/admin").pattern,
            "/users/admin"
        );
        let m = must_match(&router, Method::GET, "/users/42");
        assert_eq!(&*m.pattern, "/users/:id");
        assert_eq!(m.params[0].1, "42");
    }

    #[test]
    fn trailing_slash_routes_are_distinct() {
        let mut router = Router::default();
        router.add_route(Method::GET, "/a", chain()).unwrap();
        assert!(matches!(
            router.resolve(&Method::GET, "/a/"),
            RouteResolution::NotFound
        ));
        router.add_route(Method::GET, "/a/", chain()).unwrap();
        assert!(matches!(
            router.resolve(&Method::GET, "/a/"),
            RouteResolution::Matched(_)
        ));
    }
}
