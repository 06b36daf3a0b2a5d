use may_minihttp::Response;

use crate::context::ResponseParts;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Flush accumulated response parts onto the wire.
///
/// Headers are accumulated as owned strings; `may_minihttp` wants `&'static
/// str` header lines, so each line is leaked. Responses carry a handful of
/// short headers, so the leak stays bounded per request.
pub fn write_response(res: &mut Response, parts: ResponseParts) {
    res.status_code(parts.status as usize, status_reason(parts.status));
    for (name, value) in parts.headers {
        let line = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(line));
    }
    res.body_vec(parts.body);
}
