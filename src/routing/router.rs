//! Route lookup.
//!
//! # Responsibilities
//! - Hold the compiled route table
//! - Resolve (path, method) to a routing decision
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan, first path match wins
//! - The first path match decides even when its methods reject the request;
//!   later routes are never consulted
//! - Explicit NotFound rather than silent default

use std::sync::Arc;

use axum::http::Method;

use crate::routing::table::{Route, RouteTable};

/// Outcome of resolving one request against the table.
#[derive(Debug, Clone, Copy)]
pub enum RouteMatch<'a> {
    /// Path and method both accepted by the route at `index`.
    Matched { route: &'a Route, index: usize },
    /// The first path-matching route does not allow the method.
    MethodNotAllowed { route: &'a Route, index: usize },
    /// No route matches the path.
    NotFound,
}

impl RouteMatch<'_> {
    /// Table index of the selected route, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            RouteMatch::Matched { index, .. } | RouteMatch::MethodNotAllowed { index, .. } => {
                Some(*index)
            }
            RouteMatch::NotFound => None,
        }
    }
}

/// Resolves requests against an immutable route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Select the first route whose prefix matches `path`, then check `method`.
    pub fn resolve(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        let Some((index, route)) = self
            .table
            .iter()
            .enumerate()
            .find(|(_, route)| route.matches_path(path))
        else {
            return RouteMatch::NotFound;
        };

        if route.allows(method) {
            RouteMatch::Matched { route, index }
        } else {
            RouteMatch::MethodNotAllowed { route, index }
        }
    }
}
