//! Request dispatch: resolve, bind, drive, recover, release.

use std::any::Any;
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error};

use crate::context::{Context, ContextPool, Handler};
use crate::method::Method;
use crate::params::PathParams;
use crate::request::Request;
use crate::response::Response;
use crate::table::{RouteInfo, RouteTable};

/// Drives resolved handler chains against pooled request contexts.
///
/// Built by [`Router::into_dispatcher`](crate::Router::into_dispatcher);
/// holds the sealed route table, so lookups are lock-free and safe to run
/// from any number of concurrent workers.
pub struct Dispatcher {
    table: RouteTable,
    pool: ContextPool,
    not_found: Handler,
    error: Handler,
}

impl Dispatcher {
    pub(crate) fn new(table: RouteTable, not_found: Handler, error: Handler) -> Self {
        Self {
            table,
            pool: ContextPool::new(),
            not_found,
            error,
        }
    }

    /// Lists every registered route.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table.routes()
    }

    /// Handles one request to completion.
    ///
    /// On a resolution miss the chain is a single element: the configured
    /// not-found handler. A panic anywhere in the chain is caught here,
    /// logged with a captured backtrace, and answered by the configured
    /// 500 handler; the context is released with a full reset on every
    /// path.
    pub async fn handle(&self, request: Request) -> Response {
        let method = request.method;
        let path = request.path.clone();
        let mut cx = self.pool.acquire();

        match self.table.resolve(method, &path) {
            Some(matched) => {
                debug!(method = %method, path = %path, pattern = %matched.pattern, "route matched");
                cx.bind(request, matched.chain, matched.params);
            }
            None => {
                debug!(method = %method, path = %path, "no route matched");
                cx.bind(request, vec![Arc::clone(&self.not_found)], PathParams::new());
            }
        }

        let outcome = AssertUnwindSafe(cx.advance()).catch_unwind().await;
        let response = match outcome {
            Ok(()) => cx.take_response(),
            Err(payload) => {
                error!(
                    panic = panic_message(payload.as_ref()),
                    backtrace = %Backtrace::force_capture(),
                    "handler panicked, request recovered with 500"
                );
                self.recover(&mut cx, method, path).await
            }
        };

        self.pool.release(cx);
        response
    }

    /// Runs the configured 500 handler on a cleanly reset context. Falls
    /// back to a fixed response if that handler panics as well.
    async fn recover(&self, cx: &mut Context, method: Method, path: String) -> Response {
        cx.reset();
        cx.bind(
            Request::new(method, path),
            vec![Arc::clone(&self.error)],
            PathParams::new(),
        );

        if AssertUnwindSafe(cx.advance()).catch_unwind().await.is_ok() {
            cx.take_response()
        } else {
            error!("error handler panicked, emitting fixed 500");
            Response::internal_server_error()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{server_error_handler, BoxFuture, Context};
    use crate::method::Method;
    use crate::router::Router;

    fn greet(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let name = cx.param("name").unwrap_or("stranger").to_string();
            cx.text(200, format!("Hello, {name}"));
        })
    }

    fn boom(_cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            panic!("handler exploded");
        })
    }

    fn deny_anonymous(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if cx.header("Authorization").is_none() {
                cx.short_circuit(Arc::new(server_error_handler)).await;
            } else {
                cx.advance().await;
            }
        })
    }

    async fn dispatcher() -> Dispatcher {
        let mut router = Router::new();
        router.get("/hello/:name", Arc::new(greet)).unwrap();
        router.get("/boom", Arc::new(boom)).unwrap();
        router
            .route(
                Method::Get,
                "/private",
                vec![Arc::new(deny_anonymous), Arc::new(greet)],
            )
            .unwrap();
        router.into_dispatcher().unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_with_params() {
        let d = dispatcher().await;
        let res = d.handle(Request::get("/hello/world")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, world".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_not_found() {
        let d = dispatcher().await;
        let res = d.handle(Request::get("/nope")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body_string(), Some("404 NOT FOUND: /nope".to_string()));
    }

    #[tokio::test]
    async fn test_panic_recovered_as_500() {
        let d = dispatcher().await;
        let res = d.handle(Request::get("/boom")).await;
        assert_eq!(res.status, 500);
        assert_eq!(
            res.body_string(),
            Some("500 Internal Server Error".to_string())
        );

        // The pool survives the panic: the next request sees no state
        // from the failed one.
        let res = d.handle(Request::get("/hello/again")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, again".to_string()));
    }

    fn maintenance_page(cx: &mut Context) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let path = cx.path().to_string();
            cx.set_header("Retry-After", "30");
            cx.text(503, format!("temporarily unavailable: {path}"));
        })
    }

    #[tokio::test]
    async fn test_custom_error_handler_answers_recovered_panics() {
        let mut router = Router::new();
        router.get("/boom", Arc::new(boom)).unwrap();
        router.error_handler(Arc::new(maintenance_page));
        let d = router.into_dispatcher().unwrap();

        let res = d.handle(Request::get("/boom")).await;
        assert_eq!(res.status, 503);
        assert_eq!(res.headers.get("Retry-After").map(String::as_str), Some("30"));
        assert_eq!(
            res.body_string(),
            Some("temporarily unavailable: /boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_short_circuit_through_dispatch() {
        let d = dispatcher().await;

        let res = d.handle(Request::get("/private")).await;
        assert_eq!(res.status, 500);
        assert_eq!(
            res.body_string(),
            Some("500 Internal Server Error".to_string())
        );

        let res = d
            .handle(Request::get("/private").header("Authorization", "token"))
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body_string(), Some("Hello, stranger".to_string()));
    }

    #[tokio::test]
    async fn test_contexts_are_reused() {
        let d = dispatcher().await;
        for _ in 0..3 {
            let res = d.handle(Request::get("/hello/pool")).await;
            assert_eq!(res.body_string(), Some("Hello, pool".to_string()));
        }
    }
}
