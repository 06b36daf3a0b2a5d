//! Segment tree used by the route table for O(path length) matching.
//!
//! Each node represents one path segment. Literal children are tried before
//! parameter children, and a wildcard edge is the last resort, which gives the
//! deterministic literal > parameter > wildcard priority evaluated
//! leftmost-segment-first. Parameter children with different names can coexist
//! at one position (`/users/:id/posts` vs `/users/:user_id/comments`); the
//! search backtracks bindings when a branch fails.
//!
//! The tree stores frozen handler chains. It is built during single-threaded
//! startup and only read afterwards, so lookups take `&self`.

use std::sync::Arc;

use super::pattern::Segment;
use crate::chain::Handler;
use crate::error::RegistrationError;
use crate::router::core::ParamVec;

/// Terminal payload of a registered route.
#[derive(Clone)]
pub(crate) struct RouteEntry {
    /// Original pattern string, kept for diagnostics and match reporting.
    pub pattern: Arc<str>,
    /// Frozen handler chain bound to requests matching this route.
    pub chain: Arc<[Handler]>,
}

/// Wildcard edge: consumes every remaining segment.
#[derive(Clone)]
struct WildcardEdge {
    name: Arc<str>,
    entry: RouteEntry,
}

#[derive(Clone, Default)]
pub(crate) struct Node {
    /// Literal segment this node matches (root and param nodes leave it empty).
    segment: String,
    /// Parameter name when this node binds a segment.
    param_name: Option<Arc<str>>,
    /// Route terminating at this node, if any.
    entry: Option<RouteEntry>,
    children: Vec<Node>,
    param_children: Vec<Node>,
    wildcard: Option<Box<WildcardEdge>>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Node::default()
    }

    fn literal(segment: &str) -> Self {
        Node {
            segment: segment.to_string(),
            ..Node::default()
        }
    }

    fn param(name: &str) -> Self {
        Node {
            param_name: Some(Arc::from(name)),
            ..Node::default()
        }
    }

    /// Insert a route at the position described by `segments`.
    ///
    /// Duplicate (method, pattern) pairs are filtered out before insertion, so
    /// an occupied terminal or wildcard edge here means two distinct pattern
    /// strings collapsed onto one tree position.
    pub(crate) fn insert(
        &mut self,
        segments: &[Segment],
        entry: RouteEntry,
    ) -> Result<(), RegistrationError> {
        let Some((first, rest)) = segments.split_first() else {
            if self.entry.is_some() {
                return Err(RegistrationError::ConflictingRoute {
                    pattern: entry.pattern.to_string(),
                });
            }
            self.entry = Some(entry);
            return Ok(());
        };

        match first {
            Segment::Literal(lit) => {
                if let Some(child) = self.children.iter_mut().find(|c| c.segment == *lit) {
                    return child.insert(rest, entry);
                }
                let mut child = Node::literal(lit);
                child.insert(rest, entry)?;
                self.children.push(child);
                Ok(())
            }
            Segment::Param(name) => {
                // A sibling param with a different name but the same remaining
                // shape would silently shadow this route (only registration
                // order decides which one wins), so reject it up front.
                if self
                    .param_children
                    .iter()
                    .filter(|c| c.param_name.as_deref() != Some(name.as_str()))
                    .any(|c| c.has_terminal_at_shape(rest))
                {
                    return Err(RegistrationError::ConflictingRoute {
                        pattern: entry.pattern.to_string(),
                    });
                }
                if let Some(child) = self
                    .param_children
                    .iter_mut()
                    .find(|c| c.param_name.as_deref() == Some(name.as_str()))
                {
                    return child.insert(rest, entry);
                }
                let mut child = Node::param(name);
                child.insert(rest, entry)?;
                self.param_children.push(child);
                Ok(())
            }
            Segment::Wildcard(name) => {
                if self.wildcard.is_some() {
                    return Err(RegistrationError::ConflictingRoute {
                        pattern: entry.pattern.to_string(),
                    });
                }
                self.wildcard = Some(Box::new(WildcardEdge {
                    name: Arc::from(name.as_str()),
                    entry,
                }));
                Ok(())
            }
        }
    }

    /// Search for the highest-priority route matching `segments`.
    ///
    /// Bindings pushed for a failed parameter branch are popped before the
    /// next candidate is tried.
    pub(crate) fn search<'n>(
        &'n self,
        segments: &[&str],
        params: &mut ParamVec,
    ) -> Option<&'n RouteEntry> {
        let Some((segment, rest)) = segments.split_first() else {
            return self.entry.as_ref();
        };

        for child in &self.children {
            if child.segment == *segment {
                if let Some(entry) = child.search(rest, params) {
                    return Some(entry);
                }
            }
        }

        if !segment.is_empty() {
            for child in &self.param_children {
                if let Some(name) = &child.param_name {
                    params.push((Arc::clone(name), (*segment).to_string()));
                    if let Some(entry) = child.search(rest, params) {
                        return Some(entry);
                    }
                    params.pop();
                }
            }
        }

        if let Some(wildcard) = &self.wildcard {
            params.push((Arc::clone(&wildcard.name), segments.join("/")));
            return Some(&wildcard.entry);
        }

        None
    }

    /// True when this subtree holds a route terminating at exactly the shape
    /// described by `segments`, with parameter names ignored. Used to detect
    /// same-shape registrations under differently named params.
    fn has_terminal_at_shape(&self, segments: &[Segment]) -> bool {
        let Some((first, rest)) = segments.split_first() else {
            return self.entry.is_some();
        };
        match first {
            Segment::Literal(lit) => self
                .children
                .iter()
                .any(|c| c.segment == *lit && c.has_terminal_at_shape(rest)),
            Segment::Param(_) => self
                .param_children
                .iter()
                .any(|c| c.has_terminal_at_shape(rest)),
            Segment::Wildcard(_) => self.wildcard.is_some(),
        }
    }

    /// True when this subtree holds at least one route matching `segments`.
    /// Used for the optional 405 probe across other methods' trees.
    pub(crate) fn would_match(&self, segments: &[&str]) -> bool {
        let mut scratch = ParamVec::new();
        self.search(segments, &mut scratch).is_some()
    }
}
