//! Request handlers.
//!
//! A [`Handler`] is called once per request with exclusive access to it. It
//! answers by committing a response through [`Request::respond`], or leaves the
//! engine to send the default `200 OK`.
//!
//! [`ErrorHandler`] is the capability a request uses to render error
//! responses; [`DefaultErrorHandler`] is installed unless replaced.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, StatusCode, header};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::codec::status_text;
use crate::request::Request;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: &mut Request<'_>);
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, req: &mut Request<'_>) {
        (**self).call(req).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, req: &mut Request<'_>) {
        (**self).call(req).await
    }
}

/// Adapter turning a closure into a [`Handler`], see [`handler_fn`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a, 'conn> Fn(&'a mut Request<'conn>) -> BoxFuture<'a, ()> + Send + Sync,
{
    async fn call(&self, req: &mut Request<'_>) {
        (self.f)(req).await
    }
}

/// Wraps a closure returning a boxed future as a [`Handler`].
///
/// ```
/// use twig_http::handler::handler_fn;
///
/// let hello = handler_fn(|req| Box::pin(async move {
///     req.respond(http::StatusCode::OK, http::HeaderMap::new()).await;
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a, 'conn> Fn(&'a mut Request<'conn>) -> BoxFuture<'a, ()> + Send + Sync,
{
    HandlerFn { f }
}

/// A handler that answers every request with the same error status.
#[derive(Debug, Clone, Copy)]
pub struct StatusHandler(pub StatusCode);

#[async_trait]
impl Handler for StatusHandler {
    async fn call(&self, req: &mut Request<'_>) {
        req.error(self.0).await
    }
}

/// Renders error responses.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn handle(&self, req: &mut Request<'_>, status: StatusCode, headers: HeaderMap);
}

/// Responds with `text/plain` carrying the status text, and logs the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

#[async_trait]
impl ErrorHandler for DefaultErrorHandler {
    async fn handle(&self, req: &mut Request<'_>, status: StatusCode, mut headers: HeaderMap) {
        warn!(uri = %req.uri(), status = status.as_u16(), "error response");

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        let text = status_text(status);

        if let Some(mut body) = req.respond(status, headers).await {
            if let Err(e) = body.write_all(text.as_bytes()).await {
                warn!(cause = %e, "can't write error response body");
            }
        }
    }
}
