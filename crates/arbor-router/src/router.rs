//! Top-level router builder.

use std::sync::Arc;

use tracing::info;

use crate::context::{not_found_handler, server_error_handler, Handler};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::group::RouteGroup;
use crate::method::Method;
use crate::table::{RouteInfo, RouteTable};

/// Configures routes, groups and middleware, then finalizes into a
/// [`Dispatcher`].
///
/// The router owns its [`RouteTable`]; multiple routers can coexist in
/// one process. Middleware recorded here is applied exactly once, when
/// [`Router::into_dispatcher`] runs — routes registered after that point
/// are unrepresentable, because finalizing consumes the router and seals
/// the table.
pub struct Router {
    table: RouteTable,
    /// (prefix, middleware) records in declaration order; index 0 is the
    /// global (empty-prefix) list.
    groups: Vec<(String, Vec<Handler>)>,
    not_found: Handler,
    error: Handler,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            groups: vec![(String::new(), Vec::new())],
            not_found: Arc::new(not_found_handler),
            error: Arc::new(server_error_handler),
        }
    }

    /// Registers a route with an explicit handler chain.
    pub fn route(&mut self, method: Method, pattern: &str, chain: Vec<Handler>) -> Result<()> {
        self.table.register(method, pattern, chain)
    }

    /// Registers a GET route.
    pub fn get(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        self.route(Method::Get, pattern, vec![handler])
    }

    /// Registers a HEAD route.
    pub fn head(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        self.route(Method::Head, pattern, vec![handler])
    }

    /// Registers a POST route.
    pub fn post(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        self.route(Method::Post, pattern, vec![handler])
    }

    /// Registers a PUT route.
    pub fn put(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        self.route(Method::Put, pattern, vec![handler])
    }

    /// Registers a DELETE route.
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        self.route(Method::Delete, pattern, vec![handler])
    }

    /// Registers a PATCH route.
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        self.route(Method::Patch, pattern, vec![handler])
    }

    /// Registers a route under every supported HTTP method.
    pub fn any(&mut self, pattern: &str, handler: Handler) -> Result<()> {
        for method in Method::ALL {
            self.route(method, pattern, vec![handler.clone()])?;
        }
        Ok(())
    }

    /// Records a global middleware, applied to every route when the
    /// router is finalized.
    pub fn middleware(&mut self, mw: Handler) {
        self.groups[0].1.push(mw);
    }

    /// Mounts a [`RouteGroup`]: registers its routes now and records its
    /// middleware for application at finalization.
    pub fn mount(&mut self, group: RouteGroup) -> Result<()> {
        for (method, pattern, chain) in group.routes {
            self.table.register(method, &pattern, chain)?;
        }
        if !group.middlewares.is_empty() {
            self.groups.push((group.prefix, group.middlewares));
        }
        for child in group.children {
            self.groups.push(child);
        }
        Ok(())
    }

    /// Replaces the handler used when no route matches.
    pub fn not_found(&mut self, handler: Handler) {
        self.not_found = handler;
    }

    /// Replaces the handler that answers a request recovered from a
    /// handler panic.
    pub fn error_handler(&mut self, handler: Handler) {
        self.error = handler;
    }

    /// Lists every registered route.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table.routes()
    }

    /// Applies all recorded middleware, seals the table and produces the
    /// dispatcher.
    ///
    /// Groups recorded earlier end up outermost in each chain, so global
    /// middleware runs before group middleware, which runs before the
    /// route's own handlers.
    ///
    /// # Errors
    ///
    /// Propagates [`RouterError::Sealed`](crate::RouterError::Sealed) if
    /// the table was sealed externally.
    pub fn into_dispatcher(mut self) -> Result<Dispatcher> {
        for (prefix, middlewares) in self.groups.iter().rev() {
            self.table.attach_middleware(prefix, middlewares)?;
        }
        self.table.seal();
        info!(routes = self.table.routes().len(), "router finalized");
        Ok(Dispatcher::new(self.table, self.not_found, self.error))
    }
}
