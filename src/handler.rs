//! Route handlers.
//!
//! Any `async fn` or closure taking a [`Request`] and resolving to something
//! [`IntoResponse`] is a [`Handler`]. The router stores each one as an
//! [`Endpoint`] so routes with different handler types share one tree.
//!
//! Closures are how controllers hand shared state to their handlers:
//!
//! ```rust,ignore
//! let config = Arc::clone(&config);
//! router.get(path, move |req: Request| {
//!     let config = Arc::clone(&config);
//!     async move { health(req, &config) }
//! })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

pub(crate) type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Object-safe form of a handler, already converted to [`Response`].
#[doc(hidden)]
pub trait Endpoint: Send + Sync {
    fn call(&self, req: Request) -> HandlerFuture;
}

impl<F> Endpoint for F
where
    F: Fn(Request) -> HandlerFuture + Send + Sync,
{
    fn call(&self, req: Request) -> HandlerFuture {
        self(req)
    }
}

pub(crate) type SharedEndpoint = Arc<dyn Endpoint>;

/// Implemented for every valid route handler. Never implemented by hand.
pub trait Handler: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> Arc<dyn Endpoint>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn into_endpoint(self) -> Arc<dyn Endpoint> {
        Arc::new(move |req: Request| -> HandlerFuture {
            let fut = self(req);
            Box::pin(async move { fut.await.into_response() })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use http::StatusCode;

    #[tokio::test]
    async fn async_fn_and_closure_both_convert() {
        async fn teapot(_req: Request) -> StatusCode {
            StatusCode::IM_A_TEAPOT
        }
        let a = teapot.into_endpoint();
        let b = (|req: Request| async move { req.path().to_owned() }).into_endpoint();

        let res = a.call(Request::new(Method::Get, "/")).await;
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);

        let res = b.call(Request::new(Method::Get, "/echo")).await;
        assert_eq!(res.body(), b"/echo");
    }
}
