use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

use crate::context::RequestParts;
use crate::router::ParamVec;
use std::sync::Arc;

/// Parse query string parameters from a raw request path.
///
/// Extracts everything after the `?` character and URL-decodes names and
/// values. Repeated names are all kept; lookups take the last occurrence.
pub fn parse_query_params(raw_path: &str) -> ParamVec {
    match raw_path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Extract method, path, headers, query parameters, and body from a raw
/// `may_minihttp::Request`.
///
/// The path is split at the first `?` and percent-decoded; an unknown method
/// token falls back to GET. Header names are lowercased for case-insensitive
/// lookup.
pub fn parse_request(req: Request) -> RequestParts {
    let method =
        Method::from_bytes(req.method().as_bytes()).unwrap_or(Method::GET);
    let raw_path = req.path().to_string();
    let path_part = raw_path.split('?').next().unwrap_or("/");
    let path = match urlencoding::decode(path_part) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path_part.to_string(),
    };

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query_params = parse_query_params(&raw_path);

    let mut body = Vec::new();
    let _ = req.body().read_to_end(&mut body);

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_count = query_params.len(),
        body_bytes = body.len(),
        "request parsed"
    );

    RequestParts {
        method,
        path,
        headers,
        query_params,
        body,
    }
}
