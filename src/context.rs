//! Per-request context: parameter bindings, chain cursor, response buffer.
//!
//! A `Context` is created per inbound request, owned exclusively by the
//! coroutine handling that request, and discarded when the response has been
//! flushed. Chain continuation is an explicit cursor rather than transport
//! recursion: [`Context::next`] increments the cursor and invokes exactly the
//! unit at that position, so abort and exhaustion semantics stay testable
//! without a server in the loop.

use http::Method;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};

use crate::chain::Handler;
use crate::router::ParamVec;

/// Cursor value meaning "chain not started yet".
const NOT_STARTED: isize = -1;

/// Request data extracted by the transport layer before the chain runs.
///
/// The router treats the body as an opaque byte buffer; parsing it is the
/// handler's concern.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: Method,
    /// Percent-decoded path with the query string stripped.
    pub path: String,
    /// Header names lowercased by the transport layer.
    pub headers: HashMap<String, String>,
    pub query_params: ParamVec,
    pub body: Vec<u8>,
}

/// Buffered response, flushed to the transport exactly once per request.
#[derive(Debug, Clone, Default)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Set by the first status/body write; later writes are ignored.
    pub written: bool,
}

/// The mutable per-request object handed to every unit in a handler chain.
pub struct Context {
    request: RequestParts,
    params: ParamVec,
    chain: Arc<[Handler]>,
    cursor: isize,
    aborted: bool,
    no_route: Option<Handler>,
    response: ResponseParts,
}

impl Context {
    /// Bind a fresh context to a resolved chain. `no_route` is the engine's
    /// configured fall-through handler, used by [`Context::not_found`].
    pub fn new(
        request: RequestParts,
        params: ParamVec,
        chain: Arc<[Handler]>,
        no_route: Option<Handler>,
    ) -> Self {
        Self {
            request,
            params,
            chain,
            cursor: NOT_STARTED,
            aborted: false,
            no_route,
            response: ResponseParts::default(),
        }
    }

    // --- request accessors ---

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Path parameter bound during matching, or `""` if unset.
    ///
    /// Last write wins when duplicate names occur across nesting levels.
    pub fn param(&self, name: &str) -> &str {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Query string parameter, last write wins for repeated names.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.request
            .query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Request header by name (stored lowercased by the transport layer).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Raw request body. Parsing is out of routing scope.
    pub fn body_bytes(&self) -> &[u8] {
        &self.request.body
    }

    // --- chain control ---

    /// Run the bound chain from the start.
    pub fn run(&mut self) {
        self.cursor = NOT_STARTED;
        self.aborted = false;
        self.next();
    }

    /// Advance the cursor and invoke the unit at that position.
    ///
    /// No-op once the chain is exhausted or aborted; each position is invoked
    /// at most once per request. A middleware that never calls `next`
    /// short-circuits everything downstream of it.
    pub fn next(&mut self) {
        if self.aborted {
            return;
        }
        let idx = self.cursor + 1;
        if idx as usize >= self.chain.len() {
            self.cursor = self.chain.len() as isize;
            return;
        }
        self.cursor = idx;
        let unit = Arc::clone(&self.chain[idx as usize]);
        (*unit)(self);
    }

    /// Mark the chain terminated. Units already on the stack finish their
    /// post-`next` code, but no new unit runs and later `next` calls are
    /// no-ops.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    // --- response helpers (formatting wrappers over the buffered sink) ---

    /// True once a status/body has been committed.
    pub fn is_written(&self) -> bool {
        self.response.written
    }

    /// Status committed so far (0 when nothing was written yet).
    pub fn response_status(&self) -> u16 {
        self.response.status
    }

    /// Add or replace a response header. Only allowed before the body write;
    /// once the response is committed the header set is frozen along with it.
    pub fn set_header(&mut self, name: &str, value: &str) {
        if self.response.written {
            warn!(
                path = %self.request.path,
                header = %name,
                "response already written, ignoring header"
            );
            return;
        }
        self.response
            .headers
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.response
            .headers
            .push((name.to_string(), value.to_string()));
    }

    /// Commit a raw body. The first write wins; the transport flushes the
    /// buffer exactly once, so a second write is dropped with a warning
    /// instead of corrupting the wire.
    pub fn bytes(&mut self, status: u16, body: Vec<u8>) {
        if self.response.written {
            warn!(
                path = %self.request.path,
                status = status,
                "response already written, ignoring second write"
            );
            return;
        }
        self.response.status = status;
        self.response.body = body;
        self.response.written = true;
    }

    /// Commit a `text/plain` body.
    pub fn string(&mut self, status: u16, body: &str) {
        if self.response.written {
            warn!(path = %self.request.path, "response already written, ignoring second write");
            return;
        }
        self.set_header("Content-Type", "text/plain");
        self.bytes(status, body.as_bytes().to_vec());
    }

    /// Serialize `value` as an `application/json` body.
    pub fn json<T: Serialize>(&mut self, status: u16, value: &T) {
        if self.response.written {
            warn!(path = %self.request.path, "response already written, ignoring second write");
            return;
        }
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.set_header("Content-Type", "application/json");
                self.bytes(status, body);
            }
            Err(e) => {
                error!(path = %self.request.path, error = %e, "response serialization failed");
                self.set_header("Content-Type", "application/json");
                self.bytes(
                    500,
                    br#"{"error":"Internal Server Error"}"#.to_vec(),
                );
            }
        }
    }

    /// Commit a status with an empty body.
    pub fn write_status(&mut self, status: u16) {
        self.bytes(status, Vec::new());
    }

    /// Respond not-found, falling through to the engine's configured
    /// no-route handler when one is present. The handler is taken out of the
    /// context first so it cannot recurse into itself.
    pub fn not_found(&mut self) {
        if let Some(handler) = self.no_route.take() {
            (*handler)(self);
            if self.response.written {
                return;
            }
        }
        self.json(
            404,
            &serde_json::json!({ "error": "Not Found", "path": self.request.path }),
        );
    }

    /// Consume the context, yielding the buffered response for the transport
    /// to flush.
    pub fn into_response(self) -> ResponseParts {
        self.response
    }

    /// Borrow the buffered response (used by middleware and tests).
    pub fn response(&self) -> &ResponseParts {
        &self.response
    }
}
