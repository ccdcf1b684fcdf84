//! Prefix route groups.

use crate::context::Handler;
use crate::method::Method;

/// A group of routes sharing a path prefix and a middleware list.
///
/// Groups exist only at configuration time: mounting a group registers
/// its routes and records its middleware on the router, and request
/// handling never sees the group again.
pub struct RouteGroup {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<Handler>,
    pub(crate) routes: Vec<(Method, String, Vec<Handler>)>,
    /// Middleware records contributed by nested groups, keyed by their
    /// full prefix.
    pub(crate) children: Vec<(String, Vec<Handler>)>,
}

impl RouteGroup {
    /// Creates a group with the given prefix. The prefix is normalized to
    /// a leading slash and no trailing slash.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: clean_prefix(prefix),
            middlewares: Vec::new(),
            routes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the normalized prefix of this group.
    pub fn base_path(&self) -> &str {
        &self.prefix
    }

    /// Adds a route with an explicit handler chain.
    #[must_use]
    pub fn route(mut self, method: Method, path: &str, chain: Vec<Handler>) -> Self {
        self.routes
            .push((method, format!("{}{}", self.prefix, path), chain));
        self
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get(self, path: &str, handler: Handler) -> Self {
        self.route(Method::Get, path, vec![handler])
    }

    /// Adds a HEAD route.
    #[must_use]
    pub fn head(self, path: &str, handler: Handler) -> Self {
        self.route(Method::Head, path, vec![handler])
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post(self, path: &str, handler: Handler) -> Self {
        self.route(Method::Post, path, vec![handler])
    }

    /// Adds a PUT route.
    #[must_use]
    pub fn put(self, path: &str, handler: Handler) -> Self {
        self.route(Method::Put, path, vec![handler])
    }

    /// Adds a DELETE route.
    #[must_use]
    pub fn delete(self, path: &str, handler: Handler) -> Self {
        self.route(Method::Delete, path, vec![handler])
    }

    /// Adds a PATCH route.
    #[must_use]
    pub fn patch(self, path: &str, handler: Handler) -> Self {
        self.route(Method::Patch, path, vec![handler])
    }

    /// Adds a route under every supported HTTP method.
    #[must_use]
    pub fn any(mut self, path: &str, handler: Handler) -> Self {
        for method in Method::ALL {
            self = self.route(method, path, vec![handler.clone()]);
        }
        self
    }

    /// Adds middleware to this group. Applied to every route of the group
    /// (and its nested groups) when the router is finalized.
    #[must_use]
    pub fn middleware(mut self, mw: Handler) -> Self {
        self.middlewares.push(mw);
        self
    }

    /// Nests a child group under this one; the child's routes and
    /// middleware records are re-prefixed with this group's prefix.
    #[must_use]
    pub fn nest(mut self, child: Self) -> Self {
        for (method, path, chain) in child.routes {
            self.routes
                .push((method, format!("{}{}", self.prefix, path), chain));
        }
        if !child.middlewares.is_empty() {
            self.children
                .push((format!("{}{}", self.prefix, child.prefix), child.middlewares));
        }
        for (prefix, middlewares) in child.children {
            self.children
                .push((format!("{}{}", self.prefix, prefix), middlewares));
        }
        self
    }
}

/// Normalizes a group prefix: leading slash added, one trailing slash
/// stripped. A bare `/` collapses to the empty prefix.
fn clean_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        return String::new();
    }
    let mut clean = String::new();
    if !prefix.starts_with('/') {
        clean.push('/');
    }
    clean.push_str(prefix);
    if clean.ends_with('/') {
        clean.pop();
    }
    clean
}
