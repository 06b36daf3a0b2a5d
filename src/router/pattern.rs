//! Route pattern parsing and per-pattern matching.
//!
//! A pattern is an ordered sequence of typed segments rather than a string
//! that gets re-parsed at match time:
//!
//! - literal segments match exactly and case-sensitively (`/users`)
//! - named parameters match exactly one non-empty segment (`/:id`)
//! - a wildcard matches the remainder of the path, slashes included
//!   (`/*filepath`), and must be the last segment
//!
//! All structural validation happens here, at registration time. Matching a
//! request path can only ever fail with "no match".

use std::collections::HashSet;
use std::sync::Arc;

use super::core::ParamVec;
use crate::error::RegistrationError;

/// One slash-delimited piece of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Exact, case-sensitive match.
    Literal(String),
    /// `:name` — binds one non-empty path segment to `name`.
    Param(String),
    /// `*name` — binds the rest of the path to `name`. Always last.
    Wildcard(String),
}

/// A parsed, validated route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse and validate a pattern string.
    ///
    /// Rejected shapes: empty string, missing leading slash, interior empty
    /// segments (`/a//b`), unnamed markers (`/:` or `/*`), duplicate
    /// parameter names within the pattern, and a wildcard anywhere but the
    /// final position. A single trailing empty segment is allowed so that
    /// `/a` and `/a/` stay distinct patterns.
    pub fn parse(raw: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason: &str| RegistrationError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if !raw.starts_with('/') {
            return Err(invalid("pattern must begin with '/'"));
        }

        let mut segments = Vec::new();
        let mut seen_names: HashSet<&str> = HashSet::new();

        let rest = &raw[1..];
        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            for (i, part) in parts.iter().enumerate() {
                let last = i + 1 == parts.len();
                if part.is_empty() {
                    if last {
                        // Trailing slash: a significant empty literal segment.
                        segments.push(Segment::Literal(String::new()));
                    } else {
                        return Err(invalid("empty segment (double slash)"));
                    }
                } else if let Some(name) = part.strip_prefix(':') {
                    if name.is_empty() {
                        return Err(invalid("parameter segment is missing a name"));
                    }
                    if !seen_names.insert(name) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    segments.push(Segment::Param(name.to_string()));
                } else if let Some(name) = part.strip_prefix('*') {
                    if name.is_empty() {
                        return Err(invalid("wildcard segment is missing a name"));
                    }
                    if !seen_names.insert(name) {
                        return Err(invalid("duplicate parameter name"));
                    }
                    if !last {
                        return Err(invalid("wildcard must be the last segment"));
                    }
                    segments.push(Segment::Wildcard(name.to_string()));
                } else {
                    segments.push(Segment::Literal(part.to_string()));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The original pattern string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Match a concrete request path against this single pattern.
    ///
    /// The path is expected to be percent-decoded with the query string
    /// already stripped. Returns the parameter bindings on a match, `None`
    /// otherwise. O(segments).
    pub fn matches(&self, path: &str) -> Option<ParamVec> {
        let path_segments = split_path(path);
        let mut params = ParamVec::new();

        let mut idx = 0usize;
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    if path_segments.get(idx) != Some(&lit.as_str()) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Param(name) => {
                    let value = path_segments.get(idx)?;
                    if value.is_empty() {
                        return None;
                    }
                    params.push((Arc::from(name.as_str()), (*value).to_string()));
                    idx += 1;
                }
                Segment::Wildcard(name) => {
                    // Needs at least one remaining segment, which may be the
                    // empty segment produced by a trailing slash.
                    if idx >= path_segments.len() {
                        return None;
                    }
                    params.push((Arc::from(name.as_str()), path_segments[idx..].join("/")));
                    return Some(params);
                }
            }
        }

        if idx == path_segments.len() {
            Some(params)
        } else {
            None
        }
    }
}

/// Split a request path into slash-delimited segments.
///
/// `/` yields no segments; a trailing slash yields a final empty segment so
/// that `/a` and `/a/` remain distinct.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        Vec::new()
    } else {
        rest.split('/').collect()
    }
}
