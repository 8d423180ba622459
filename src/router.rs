//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Each route carries its
//! handler plus an optional per-route [`Pipeline`] (transaction logging,
//! payload sanitizing) that runs after path params are known.

use std::collections::HashMap;

use matchit::Router as MatchitRouter;
use serde_json::{Map, Value};

use crate::handler::{Handler, SharedEndpoint};
use crate::method::Method;
use crate::middleware::Pipeline;

/// A registered route: its middleware and its handler.
#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) pipeline: Pipeline,
    pub(crate) handler: SharedEndpoint,
}

/// The application router.
///
/// Build it once at startup. Every registration returns `self` so calls
/// chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an existing route.
    /// Routes are registered at start-up, so this is a programming error.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.on_with(method, path, Pipeline::new(), handler)
    }

    /// Like [`on`](Router::on), running `pipeline` before the handler.
    pub fn on_with(
        mut self,
        method: Method,
        path: &str,
        pipeline: Pipeline,
        handler: impl Handler,
    ) -> Self {
        let route = Route { pipeline, handler: handler.into_endpoint() };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Option<(Route, Map<String, Value>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let route = matched.value.clone();
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned())))
            .collect();
        Some((route, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Response;

    async fn noop(_req: crate::Request) -> Response {
        Response::text("")
    }

    #[test]
    fn lookup_extracts_params() {
        let router = Router::new().get("/users/{id}", noop);
        let (_, params) = router.lookup(Method::Get, "/users/42").unwrap();
        assert_eq!(params["id"], "42");
    }

    #[test]
    fn lookup_is_per_method() {
        let router = Router::new().post("/users", noop);
        assert!(router.lookup(Method::Get, "/users").is_none());
        assert!(router.lookup(Method::Post, "/users").is_some());
    }
}
