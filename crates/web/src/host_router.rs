//! Routing by the `Host` header.

use std::fmt;

use async_trait::async_trait;
use http::StatusCode;
use tracing::trace;
use twig_http::handler::{Handler, StatusHandler};
use twig_http::request::Request;

use crate::{Pattern, RouteError};

/// Dispatches requests by host name.
///
/// Patterns use the same placeholder syntax as paths, with `.` as the
/// separator, so `<sub>.example.com` captures one label. The host is
/// lower-cased before matching; routes are tried in registration order and a
/// request matching none of them goes to the default handler, which answers
/// `404` unless replaced.
pub struct HostRouter {
    routes: Vec<(Pattern, Box<dyn Handler>)>,
    default_handler: Box<dyn Handler>,
}

impl HostRouter {
    pub fn builder() -> HostRouterBuilder {
        HostRouterBuilder::default()
    }

    fn find<'r>(&'r self, host: &str) -> (&'r dyn Handler, Vec<(&'r str, String)>) {
        for (pattern, handler) in &self.routes {
            if let Some(values) = pattern.captures(host) {
                let params = pattern.names().iter().map(String::as_str).zip(values.into_iter().map(str::to_string)).collect();
                return (handler.as_ref(), params);
            }
        }
        (self.default_handler.as_ref(), Vec::new())
    }
}

impl fmt::Debug for HostRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRouter")
            .field("routes", &self.routes.iter().map(|(pattern, _)| pattern.source()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for HostRouter {
    async fn call(&self, req: &mut Request<'_>) {
        let host = req.host().unwrap_or_default().to_ascii_lowercase();
        let (handler, params) = self.find(&host);
        trace!(host = %host, params = params.len(), "host routed");

        for (name, value) in params {
            req.params_mut().insert(name, value);
        }
        handler.call(req).await;
    }
}

#[derive(Default)]
pub struct HostRouterBuilder {
    routes: Vec<(String, Box<dyn Handler>)>,
    default_handler: Option<Box<dyn Handler>>,
}

impl fmt::Debug for HostRouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRouterBuilder")
            .field("routes", &self.routes.iter().map(|(pattern, _)| pattern).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl HostRouterBuilder {
    pub fn route<H: Handler + 'static>(mut self, pattern: impl Into<String>, handler: H) -> Self {
        self.routes.push((pattern.into(), Box::new(handler)));
        self
    }

    /// The handler for hosts matching no route.
    pub fn default_handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.default_handler = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> Result<HostRouter, RouteError> {
        let routes = self
            .routes
            .into_iter()
            .map(|(pattern, handler)| Ok((Pattern::compile(&pattern, false, '.')?, handler)))
            .collect::<Result<Vec<_>, RouteError>>()?;
        let default_handler = self.default_handler.unwrap_or_else(|| Box::new(StatusHandler(StatusCode::NOT_FOUND)));

        Ok(HostRouter { routes, default_handler })
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, StatusCode};
    use tokio::io::AsyncWriteExt;
    use twig_http::handler::{Handler, handler_fn};

    use super::HostRouter;
    use crate::test_io::serve;

    fn echo(tag: &'static str) -> impl Handler {
        handler_fn(move |req| {
            Box::pin(async move {
                let text = format!("{tag} sub={}", req.params().get("sub").unwrap_or("-"));
                if let Some(mut body) = req.respond(StatusCode::OK, HeaderMap::new()).await {
                    body.write_all(text.as_bytes()).await.unwrap();
                }
            })
        })
    }

    fn router() -> HostRouter {
        HostRouter::builder()
            .route("<sub:[a-z]+>.example.com", echo("sub"))
            .route("example.com", echo("apex"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn host_is_matched_case_insensitively() {
        let output = serve(router(), "GET / HTTP/1.1\nHost: API.Example.com\n\n").await;
        assert!(output.contains("sub sub=api"));
    }

    #[tokio::test]
    async fn first_matching_route_wins() {
        let output = serve(router(), "GET / HTTP/1.1\nHost: example.com\n\n").await;
        assert!(output.contains("apex sub=-"));
    }

    #[tokio::test]
    async fn unmatched_host_is_not_found() {
        let output = serve(router(), "GET / HTTP/1.1\nHost: example.org\n\n").await;
        assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));

        let output = serve(router(), "GET / HTTP/1.1\n\n").await;
        assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn port_takes_part_in_matching() {
        let output = serve(router(), "GET / HTTP/1.1\nHost: api.example.com:8080\n\n").await;
        assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn custom_default_handler() {
        let router = HostRouter::builder().default_handler(echo("fallback")).build().unwrap();
        let output = serve(router, "GET / HTTP/1.1\nHost: anything\n\n").await;
        assert!(output.contains("fallback sub=-"));
    }

    #[test]
    fn invalid_host_pattern() {
        assert!(HostRouter::builder().route("<sub:[a-z>.example.com", echo("x")).build().is_err());
    }
}
