//! Per-request execution context, handler chains and the context pool.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

use crate::method::Method;
use crate::params::PathParams;
use crate::request::Request;
use crate::response::Response;

/// A boxed future for async handler operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed async handler operating on the request context.
///
/// Both middleware and terminal handlers share this shape; a middleware is
/// simply a handler that calls [`Context::advance`] somewhere in its body.
/// Free functions with the signature
/// `fn(&mut Context) -> BoxFuture<'_, ()>` coerce directly.
pub type Handler = Arc<dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, ()> + Send + Sync>;

/// The context of one in-flight request.
///
/// Carries the inbound request, the response under construction, the
/// resolved handler chain with its cursor, and the bound route
/// parameters. A context is exclusively owned by one request and returned
/// to the [`ContextPool`] with every field reset once the request
/// completes.
#[derive(Default)]
pub struct Context {
    request: Request,
    response: Response,
    params: PathParams,
    chain: Vec<Handler>,
    cursor: usize,
}

impl Context {
    /// Binds a resolved chain and parameters to this context. Called by
    /// the dispatcher after acquiring the context from the pool.
    pub(crate) fn bind(&mut self, request: Request, chain: Vec<Handler>, params: PathParams) {
        self.request = request;
        self.chain = chain;
        self.params = params;
        self.cursor = 0;
    }

    /// Resets every field to its empty state. A context must never return
    /// to the pool without passing through here: stale parameters or
    /// chain state would leak into the next request.
    pub(crate) fn reset(&mut self) {
        self.request = Request::default();
        self.response = Response::default();
        self.params.clear();
        self.chain.clear();
        self.cursor = 0;
    }

    /// Takes the finished response out of the context.
    pub(crate) fn take_response(&mut self) -> Response {
        std::mem::take(&mut self.response)
    }

    /// Runs the next handler and every one after it that is not consumed
    /// by a nested `advance` call.
    ///
    /// The chain is cooperative: a middleware that wants code to run
    /// after its successors awaits `advance` itself; a handler that never
    /// calls it truncates the chain, which is how auth or error
    /// middleware stop a request.
    pub fn advance(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.cursor += 1;
            while self.cursor <= self.chain.len() {
                let handler = Arc::clone(&self.chain[self.cursor - 1]);
                (handler)(&mut *self).await;
                self.cursor += 1;
            }
        })
    }

    /// Skips every handler that has not yet run and executes
    /// `terminal` instead.
    ///
    /// Handlers already on the stack still unwind normally, so code after
    /// their `advance` calls runs to completion.
    pub fn short_circuit(&mut self, terminal: Handler) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.chain.push(terminal);
            self.cursor = self.chain.len();
            let handler = Arc::clone(&self.chain[self.cursor - 1]);
            (handler)(&mut *self).await;
        })
    }

    /// Returns the inbound request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the request method.
    pub fn method(&self) -> Method {
        self.request.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.request.path
    }

    /// Returns a bound route parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Returns all bound route parameters.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Returns a query parameter from the request.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.get_query(key)
    }

    /// Returns a request header, case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.request.get_header(key)
    }

    /// Returns the response built so far.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns the current response status.
    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Sets the response status.
    pub fn set_status(&mut self, code: u16) {
        self.response.status = code;
    }

    /// Sets a response header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.response.headers.insert(key.into(), value.into());
    }

    /// Sets the status and appends raw bytes to the response body.
    pub fn data(&mut self, code: u16, data: &[u8]) {
        self.response.status = code;
        self.response.body.extend_from_slice(data);
    }

    /// Responds with plain text.
    pub fn text(&mut self, code: u16, body: impl AsRef<str>) {
        self.set_header("Content-Type", "text/plain; charset=utf-8");
        self.data(code, body.as_ref().as_bytes());
    }

    /// Responds with an HTML body.
    pub fn html(&mut self, code: u16, body: impl AsRef<str>) {
        self.set_header("Content-Type", "text/html; charset=utf-8");
        self.data(code, body.as_ref().as_bytes());
    }

    /// Responds with a JSON body, falling back to a 500 if the value
    /// cannot be serialized.
    pub fn json<T: serde::Serialize>(&mut self, code: u16, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.set_header("Content-Type", "application/json");
                self.data(code, &body);
            }
            Err(err) => {
                error!(error = %err, "failed to serialize response body");
                self.fail(500, "Internal Server Error");
            }
        }
    }

    /// Responds with an error status and message.
    pub fn fail(&mut self, code: u16, message: impl std::fmt::Display) {
        let body = format!("{code} {message}");
        self.text(code, body);
    }

    /// Responds with a redirect to `to`.
    pub fn redirect(&mut self, code: u16, to: impl Into<String>) {
        self.set_header("Location", to);
        self.set_status(code);
    }
}

/// Default terminal handler for unmatched routes.
pub fn not_found_handler(cx: &mut Context) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let message = format!("404 NOT FOUND: {}", cx.path());
        cx.text(404, message);
    })
}

/// Default terminal handler for server-side failures, suitable for
/// [`Context::short_circuit`].
pub fn server_error_handler(cx: &mut Context) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        cx.fail(500, "Internal Server Error");
    })
}

/// A reuse pool for request contexts.
///
/// `acquire` hands out an exclusively owned context (recycled or fresh);
/// `release` resets it fully before putting it back on the free list.
#[derive(Default)]
pub struct ContextPool {
    free: Mutex<Vec<Context>>,
}

impl ContextPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a context, allocating a fresh one if none is free.
    pub fn acquire(&self) -> Context {
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        free.pop().unwrap_or_default()
    }

    /// Resets a context and returns it to the free list. Only valid from
    /// the completion path of the request that owns it.
    pub fn release(&self, mut cx: Context) {
        cx.reset();
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        free.push(cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outer(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            cx.data(200, b"a");
            cx.advance().await;
            cx.data(200, b"d");
        })
    }

    fn plain(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            cx.data(200, b"b");
        })
    }

    fn tail(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            cx.data(200, b"X");
        })
    }

    fn breaker(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            cx.data(200, b"b");
            cx.short_circuit(Arc::new(fallback)).await;
        })
    }

    fn fallback(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            cx.data(200, b"c");
        })
    }

    async fn run(chain: Vec<Handler>) -> Context {
        let mut cx = Context::default();
        cx.bind(Request::get("/"), chain, PathParams::new());
        cx.advance().await;
        cx
    }

    #[tokio::test]
    async fn test_advance_runs_chain_in_order() {
        let cx = run(vec![Arc::new(outer), Arc::new(plain), Arc::new(tail)]).await;
        assert_eq!(cx.response().body_string(), Some("abXd".to_string()));
    }

    #[tokio::test]
    async fn test_handler_without_advance_truncates_chain() {
        // `plain` never advances, but the outer driving loop still
        // reaches `tail`: truncation only affects handlers the
        // truncating middleware was wrapping.
        let cx = run(vec![Arc::new(plain), Arc::new(tail)]).await;
        assert_eq!(cx.response().body_string(), Some("bX".to_string()));
    }

    #[tokio::test]
    async fn test_short_circuit_unwind_order() {
        // outer -> breaker -> fallback, tail never runs; outer's
        // post-advance write still lands last.
        let cx = run(vec![Arc::new(outer), Arc::new(breaker), Arc::new(tail)]).await;
        assert_eq!(cx.response().body_string(), Some("abcd".to_string()));
    }

    #[tokio::test]
    async fn test_pool_reset_on_release() {
        let pool = ContextPool::new();
        let mut cx = pool.acquire();

        let mut params = PathParams::new();
        params.insert("id", "7");
        cx.bind(
            Request::get("/users/7").header("X-Trace", "abc"),
            vec![Arc::new(plain)],
            params,
        );
        cx.advance().await;
        assert_eq!(cx.param("id"), Some("7"));
        pool.release(cx);

        let cx = pool.acquire();
        assert_eq!(cx.param("id"), None);
        assert_eq!(cx.path(), "");
        assert_eq!(cx.header("X-Trace"), None);
        assert!(cx.chain.is_empty());
        assert_eq!(cx.cursor, 0);
        assert_eq!(cx.status(), 200);
        assert!(cx.response().body.is_empty());
    }
}
