//! # arbor-router
//!
//! HTTP request routing and dispatch with middleware chains.
//!
//! This crate provides:
//! - Path-template routing over a compressed segment trie
//!   ([`arbor_trie`]) with `:param` and trailing `*wildcard` segments
//! - Per-method route tables with static-over-dynamic precedence
//! - Cooperative handler chains with before/after wrapping and
//!   short-circuiting
//! - A pooled, fully-reset per-request execution context
//! - A dispatcher with a panic-recovery boundary per request
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use arbor_router::{BoxFuture, Context, Request, Router};
//!
//! fn hello(cx: &mut Context) -> BoxFuture<'_, ()> {
//!     Box::pin(async move {
//!         let name = cx.param("name").unwrap_or("world").to_string();
//!         cx.text(200, format!("Hello, {name}"));
//!     })
//! }
//!
//! let mut router = Router::new();
//! router.get("/hello/:name", Arc::new(hello))?;
//! let dispatcher = router.into_dispatcher()?;
//!
//! // One call per inbound request, from any number of workers.
//! let response = dispatcher.handle(Request::get("/hello/you")).await;
//! ```
//!
//! ## Route templates
//!
//! - `/users` — static segments, matched verbatim
//! - `/users/:id` — `:id` binds exactly one path token
//! - `/assets/*filepath` — a trailing wildcard binds the remaining path
//!
//! At the same depth a static segment always wins over a parameter, and
//! registering a wildcard replaces its siblings; see `arbor-trie` for the
//! exact conflict rules.
//!
//! ## Middleware
//!
//! Middleware and handlers share one shape: an async function over
//! [`Context`]. A middleware wraps its successors by awaiting
//! [`Context::advance`]:
//!
//! ```ignore
//! fn timing(cx: &mut Context) -> BoxFuture<'_, ()> {
//!     Box::pin(async move {
//!         let start = std::time::Instant::now();
//!         cx.advance().await;
//!         tracing::info!(elapsed = ?start.elapsed(), "request finished");
//!     })
//! }
//! ```
//!
//! Middleware is recorded globally ([`Router::middleware`]) or per group
//! ([`RouteGroup::middleware`]) and applied exactly once, when
//! [`Router::into_dispatcher`] finalizes the configuration. Routes cannot
//! be added afterwards.
//!
//! ## Route Groups
//!
//! ```ignore
//! use arbor_router::RouteGroup;
//!
//! let api = RouteGroup::new("/api/v1")
//!     .middleware(Arc::new(require_auth))
//!     .get("/users", Arc::new(list_users))
//!     .get("/users/:id", Arc::new(get_user));
//!
//! router.mount(api)?;
//! ```

mod context;
mod dispatcher;
mod error;
mod group;
mod method;
mod params;
mod request;
mod response;
mod router;
mod table;

pub use context::{
    not_found_handler, server_error_handler, BoxFuture, Context, ContextPool, Handler,
};
pub use dispatcher::Dispatcher;
pub use error::{Result, RouterError};
pub use group::RouteGroup;
pub use method::{Method, UnknownMethod};
pub use params::PathParams;
pub use request::Request;
pub use response::Response;
pub use router::Router;
pub use table::{RouteInfo, RouteMatch, RouteTable};
