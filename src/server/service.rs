use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

use crate::chain::Handler;
use crate::context::{Context, RequestParts, ResponseParts};
use crate::group::Engine;
use crate::router::{ParamVec, RouteResolution, Router};
use crate::server::request::parse_request;
use crate::server::response::write_response;

/// Coroutine HTTP service dispatching requests through a frozen route table.
///
/// Cloned per connection by the server runtime; the table and the no-route
/// handler are shared behind `Arc`, so clones are cheap and the routes a
/// running server sees never change.
#[derive(Clone)]
pub struct AppService {
    router: Arc<Router>,
    no_route: Option<Handler>,
}

impl AppService {
    /// Freeze `engine` and build the serving service. Consuming the engine
    /// ends the registration phase; routes added to other engines afterwards
    /// are invisible here.
    pub fn new(engine: Engine) -> Self {
        let (router, no_route) = engine.freeze();
        Self { router, no_route }
    }

    fn dispatch(&self, request: RequestParts) -> ResponseParts {
        let method = request.method.clone();
        let path = request.path.clone();

        let mut parts = match self.router.resolve(&method, &path) {
            RouteResolution::Matched(route) => {
                let no_route = self.no_route.clone();
                let mut parts =
                    run_chain(request, route.params, route.chain, no_route, &method, &path);
                // A chain that never wrote still answers: empty 200.
                if !parts.written {
                    parts.status = 200;
                    parts.written = true;
                }
                parts
            }
            RouteResolution::MethodNotAllowed => {
                warn!(method = %method, path = %path, "method not allowed");
                json_error_parts(
                    405,
                    json!({ "error": "Method Not Allowed", "method": method.as_str(), "path": path }),
                )
            }
            RouteResolution::NotFound => {
                if let Some(handler) = self.no_route.clone() {
                    let mut parts = run_chain(
                        request,
                        ParamVec::new(),
                        vec![handler].into(),
                        None,
                        &method,
                        &path,
                    );
                    if !parts.written {
                        parts.status = 404;
                        parts.written = true;
                    }
                    parts
                } else {
                    json_error_parts(
                        404,
                        json!({ "error": "Not Found", "method": method.as_str(), "path": path }),
                    )
                }
            }
        };

        // HEAD answers carry headers only; the entity body must stay off the
        // wire or keep-alive clients desynchronize.
        if method == Method::HEAD {
            parts.body.clear();
        }
        parts
    }
}

/// Run a chain inside the panic boundary. Every user-supplied handler,
/// including a no-route handler, executes here so a panic becomes a generic
/// 500 instead of unwinding into the coroutine runtime.
fn run_chain(
    request: RequestParts,
    params: ParamVec,
    chain: Arc<[Handler]>,
    no_route: Option<Handler>,
    method: &Method,
    path: &str,
) -> ResponseParts {
    let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
        let mut ctx = Context::new(request, params, chain, no_route);
        ctx.run();
        ctx.into_response()
    }));
    match outcome {
        Ok(parts) => parts,
        Err(_) => {
            error!(method = %method, path = %path, "handler panicked");
            json_error_parts(500, json!({ "error": "Internal Server Error" }))
        }
    }
}

fn json_error_parts(status: u16, body: serde_json::Value) -> ResponseParts {
    ResponseParts {
        status,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.to_string().into_bytes(),
        written: true,
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = parse_request(req);
        let parts = self.dispatch(request);
        write_response(res, parts);
        Ok(())
    }
}
