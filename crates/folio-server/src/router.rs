//! Request routing and path matching.
//!
//! Routes are path templates whose `{name}` segments capture one path
//! segment each. Routes are tried in registration order and the first match
//! wins.
//!
//! # Example
//!
//! ```rust
//! use folio_server::router::{Lookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::POST, "/reports/{format}", "export").unwrap();
//!
//! match router.lookup(&Method::POST, "/reports/pdf") {
//!     Lookup::Found(found) => {
//!         assert_eq!(*found.handler, "export");
//!         assert_eq!(found.params.get("format"), Some("pdf"));
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use crate::error::{ServerError, ServerResult};
use folio_extract::Params;
use http::Method;

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route<H> {
    method: Method,
    pattern: String,
    segments: Vec<PathSegment>,
    handler: H,
}

impl<H> Route<H> {
    fn parse_segments(pattern: &str) -> ServerResult<Vec<PathSegment>> {
        if !pattern.starts_with('/') {
            return Err(ServerError::invalid_route(pattern, "must start with '/'"));
        }

        pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some("") => Err(ServerError::invalid_route(pattern, "empty parameter name")),
                Some(name) => Ok(PathSegment::Param(name.to_string())),
                None if s.contains('{') || s.contains('}') => {
                    Err(ServerError::invalid_route(pattern, "unbalanced braces"))
                }
                None => Ok(PathSegment::Literal(s.to_string())),
            })
            .collect()
    }

    fn match_path(&self, path: &str) -> Option<Params> {
        let mut actual = path.split('/').filter(|s| !s.is_empty());
        let mut params = Params::new();

        for segment in &self.segments {
            let value = actual.next()?;
            match segment {
                PathSegment::Literal(expected) if expected != value => return None,
                PathSegment::Literal(_) => {}
                PathSegment::Param(name) => params.push(name.clone(), value),
            }
        }

        actual.next().is_none().then_some(params)
    }
}

/// A matched route.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    /// Handler registered for the route.
    pub handler: &'a H,
    /// The route template, used as a low-cardinality label.
    pub pattern: &'a str,
    /// Captured path parameters.
    pub params: Params,
}

/// Outcome of a route lookup.
#[derive(Debug)]
pub enum Lookup<'a, H> {
    /// A route matches the method and the path.
    Found(RouteMatch<'a, H>),
    /// Routes match the path, but none for this method.
    MethodNotAllowed(Vec<Method>),
    /// No route matches the path.
    NotFound,
}

/// Linear router mapping method and path to a handler value.
#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> Router<H> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidRoute` if the pattern is malformed or
    /// the same method and pattern are already registered.
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: impl Into<String>,
        handler: H,
    ) -> ServerResult<()> {
        let pattern = pattern.into();
        let segments = Route::<H>::parse_segments(&pattern)?;

        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.segments == segments)
        {
            return Err(ServerError::invalid_route(pattern, "already registered"));
        }

        self.routes.push(Route {
            method,
            pattern,
            segments,
            handler,
        });
        Ok(())
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Finds the route for a request.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, H> {
        let mut allowed = Vec::new();

        for route in &self.routes {
            if let Some(params) = route.match_path(path) {
                if route.method == *method {
                    return Lookup::Found(RouteMatch {
                        handler: &route.handler,
                        pattern: &route.pattern,
                        params,
                    });
                }
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
            }
        }

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::MethodNotAllowed(allowed)
        }
    }
}
