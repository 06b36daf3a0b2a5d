//! Route groups: shared path prefixes and shared middleware.
//!
//! An [`Engine`] owns the route table for one router instance; [`Group`]s are
//! lightweight builders that accumulate a base path and a middleware prefix
//! and write fully-qualified routes into the shared table. Groups hold a
//! shared handle to the table rather than a global, so multiple independent
//! engines can coexist in one process.
//!
//! Registration happens during single-threaded startup. Constructing the
//! serving service consumes the engine and snapshots the table, after which
//! nothing can mutate the routes a running server sees.

use http::Method;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::chain::{Handler, HandlersChain};
use crate::error::RegistrationError;
use crate::router::{Router, RouterConfig};
use crate::static_files::{serve_path, StaticFiles};

/// Methods registered by [`Group::any`].
pub const ANY_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

/// Top-level builder for one router instance.
///
/// Delegates registration to a root [`Group`] with base path `/` and no
/// middleware. Handed by value to `AppService::new`, which freezes the table.
pub struct Engine {
    root: Group,
    no_route: Option<Handler>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            root: Group {
                base_path: "/".to_string(),
                middlewares: Vec::new(),
                table: Arc::new(RwLock::new(Router::new(config))),
            },
            no_route: None,
        }
    }

    /// The root group, for direct registration at `/`.
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Create a child group under `relative`.
    pub fn group(&self, relative: &str) -> Group {
        self.root.group(relative)
    }

    /// Append middleware to the root group. Only affects routes registered
    /// afterwards.
    pub fn use_middleware(&mut self, middleware: Handler) {
        self.root.use_middleware(middleware);
    }

    /// Install the handler invoked when no route matches (and when a static
    /// route misses). Replaces any previous no-route handler.
    pub fn no_route(&mut self, handler: Handler) {
        self.no_route = Some(handler);
    }

    pub fn handle(
        &self,
        method: Method,
        relative: &str,
        handlers: HandlersChain,
    ) -> Result<(), RegistrationError> {
        self.root.handle(method, relative, handlers)
    }

    pub fn get(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.get(relative, handlers)
    }

    pub fn post(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.post(relative, handlers)
    }

    pub fn put(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.put(relative, handlers)
    }

    pub fn patch(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.patch(relative, handlers)
    }

    pub fn delete(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.delete(relative, handlers)
    }

    pub fn head(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.head(relative, handlers)
    }

    pub fn options(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.options(relative, handlers)
    }

    pub fn any(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.root.any(relative, handlers)
    }

    pub fn match_methods(
        &self,
        methods: &[Method],
        relative: &str,
        handlers: HandlersChain,
    ) -> Result<(), RegistrationError> {
        self.root.match_methods(methods, relative, handlers)
    }

    pub fn static_file(
        &self,
        relative: &str,
        file: impl Into<PathBuf>,
    ) -> Result<(), RegistrationError> {
        self.root.static_file(relative, file)
    }

    pub fn static_dir(
        &self,
        relative: &str,
        dir: impl Into<PathBuf>,
    ) -> Result<(), RegistrationError> {
        self.root.static_dir(relative, dir)
    }

    /// Snapshot the table into an immutable form for the serving phase and
    /// hand back the no-route handler. Consumes the engine: registration and
    /// serving phases cannot overlap.
    pub fn freeze(self) -> (Arc<Router>, Option<Handler>) {
        #[allow(clippy::unwrap_used)] // registration is single-threaded, no poisoning
        let table = self.root.table.read().unwrap().clone();
        (Arc::new(table), self.no_route)
    }
}

/// A builder accumulating a base path and a middleware prefix.
///
/// Owns no routes: registering writes into the shared route table with the
/// fully-qualified path and the inherited-then-own middleware prepended.
#[derive(Clone)]
pub struct Group {
    base_path: String,
    middlewares: HandlersChain,
    table: Arc<RwLock<Router>>,
}

impl Group {
    /// Effective base path of this group.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Create a child group. The child's base path is this group's base
    /// joined with `relative` (exactly one separating slash, duplicate
    /// slashes collapsed); the child inherits this group's middleware.
    pub fn group(&self, relative: &str) -> Group {
        Group {
            base_path: join_paths(&self.base_path, relative),
            middlewares: self.middlewares.clone(),
            table: Arc::clone(&self.table),
        }
    }

    /// Append middleware to this group. Routes already registered keep their
    /// frozen chains; only later registrations see the addition.
    pub fn use_middleware(&mut self, middleware: Handler) {
        self.middlewares.push(middleware);
    }

    /// Register `handlers` under `method` at the group's base joined with
    /// `relative`. The final chain is the group's accumulated middleware
    /// followed by `handlers`; the last unit is conventionally the real
    /// handler.
    pub fn handle(
        &self,
        method: Method,
        relative: &str,
        handlers: HandlersChain,
    ) -> Result<(), RegistrationError> {
        let absolute = join_paths(&self.base_path, relative);
        let mut chain = self.middlewares.clone();
        chain.extend(handlers);
        #[allow(clippy::unwrap_used)] // registration is single-threaded, no poisoning
        self.table.write().unwrap().add_route(method, &absolute, chain)
    }

    pub fn get(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::GET, relative, handlers)
    }

    pub fn post(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::POST, relative, handlers)
    }

    pub fn put(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::PUT, relative, handlers)
    }

    pub fn patch(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::PATCH, relative, handlers)
    }

    pub fn delete(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::DELETE, relative, handlers)
    }

    pub fn head(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::HEAD, relative, handlers)
    }

    pub fn options(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        self.handle(Method::OPTIONS, relative, handlers)
    }

    /// Register the same handlers under every standard method
    /// (see [`ANY_METHODS`]).
    pub fn any(&self, relative: &str, handlers: HandlersChain) -> Result<(), RegistrationError> {
        for method in ANY_METHODS {
            self.handle(method, relative, handlers.clone())?;
        }
        Ok(())
    }

    /// Register the same handlers under a caller-supplied method set.
    pub fn match_methods(
        &self,
        methods: &[Method],
        relative: &str,
        handlers: HandlersChain,
    ) -> Result<(), RegistrationError> {
        for method in methods {
            self.handle(method.clone(), relative, handlers.clone())?;
        }
        Ok(())
    }

    /// Serve a single file of the local filesystem under `relative`
    /// (GET and HEAD). The route must be a literal prefix.
    pub fn static_file(
        &self,
        relative: &str,
        file: impl Into<PathBuf>,
    ) -> Result<(), RegistrationError> {
        check_static_path(relative)?;
        let file = file.into();
        let handler: Handler = Arc::new(move |ctx| serve_path(ctx, &file));
        self.handle(Method::GET, relative, vec![Arc::clone(&handler)])?;
        self.handle(Method::HEAD, relative, vec![handler])
    }

    /// Serve a directory tree under `relative` (GET and HEAD), capturing the
    /// remainder of the path as the file to resolve. Misses fall through to
    /// the engine's no-route handler; directory targets are not-found since
    /// listing is not supported.
    pub fn static_dir(
        &self,
        relative: &str,
        dir: impl Into<PathBuf>,
    ) -> Result<(), RegistrationError> {
        check_static_path(relative)?;
        let files = Arc::new(StaticFiles::new(dir.into()));
        let pattern = format!("{}/*filepath", relative.trim_end_matches('/'));
        let handler: Handler = Arc::new(move |ctx| {
            let target = ctx.param("filepath").to_string();
            match files.load(&target) {
                Ok((bytes, content_type)) => {
                    ctx.set_header("Content-Type", content_type);
                    ctx.bytes(200, bytes);
                }
                // Never leak filesystem detail to the client.
                Err(_) => ctx.not_found(),
            }
        });
        self.handle(Method::GET, &pattern, vec![Arc::clone(&handler)])?;
        self.handle(Method::HEAD, &pattern, vec![handler])
    }
}

fn check_static_path(relative: &str) -> Result<(), RegistrationError> {
    if relative.contains(':') || relative.contains('*') {
        return Err(RegistrationError::StaticPathWithMarkers(
            relative.to_string(),
        ));
    }
    Ok(())
}

/// Join a group base path with a relative path: exactly one separating
/// slash, duplicate slashes collapsed, an explicit trailing slash preserved.
fn join_paths(base: &str, relative: &str) -> String {
    if relative.is_empty() {
        return base.to_string();
    }
    let trailing = relative.ends_with('/');
    let mut joined = base.trim_end_matches('/').to_string();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        joined.push('/');
        joined.push_str(segment);
    }
    if joined.is_empty() {
        return "/".to_string();
    }
    if trailing && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_paths_single_separator() {
        assert_eq!(join_paths("/", "/v1"), "/v1");
        assert_eq!(join_paths("/v1", "/users"), "/v1/users");
        assert_eq!(join_paths("/v1/", "users"), "/v1/users");
        assert_eq!(join_paths("/v1", "users//files"), "/v1/users/files");
        assert_eq!(join_paths("/v1", ""), "/v1");
        assert_eq!(join_paths("/", "/"), "/");
    }

    #[test]
    fn join_paths_preserves_trailing_slash() {
        assert_eq!(join_paths("/v1", "users/"), "/v1/users/");
        assert_eq!(join_paths("/v1", "users"), "/v1/users");
    }

    #[test]
    fn nested_groups_compose_base_paths() {
        let engine = Engine::new();
        let v1 = engine.group("/v1");
        let users = v1.group("/users");
        assert_eq!(users.base_path(), "/v1/users");
    }
}
