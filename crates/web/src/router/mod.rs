//! Path routing.
//!
//! A [`Router`] keeps an ordered list of routes. Each route pairs a path
//! pattern (see [`Pattern`](crate::Pattern)) with a table of handlers keyed
//! by request method. Routes are tried in registration order and the first
//! one whose pattern matches the request path decides the outcome:
//!
//! - a pattern ending with `/` redirects the path without the trailing slash
//!   to the path with it (`301`, query preserved);
//! - a captured value that fails to unescape answers `404`;
//! - the handler is looked up by the request method, then `GET` for `HEAD`
//!   requests, then the `*` handler; if none is registered the router
//!   answers `405`.
//!
//! When no pattern matches, the router answers `404`.
//!
//! ```
//! use twig_http::handler::handler_fn;
//! use twig_web::router::{Router, any, get};
//!
//! let router = Router::builder()
//!     .route("/user/<id:[0-9]+>", get(handler_fn(|req| Box::pin(async move {
//!         let _id = req.params().get("id");
//!     }))))
//!     .route("/files/", any(handler_fn(|_req| Box::pin(async {}))))
//!     .build()
//!     .unwrap();
//! ```

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use http::{Method, StatusCode};
use tracing::{debug, trace};
use twig_http::handler::Handler;
use twig_http::request::Request;

use crate::{Pattern, RouteError, unescape};

/// Dispatches requests by path and method.
pub struct Router {
    routes: Vec<Route>,
}

struct Route {
    pattern: Pattern,
    add_slash: bool,
    handlers: MethodHandlers,
}

/// Outcome of matching a path and method against a [`Router`].
pub enum RouteMatch<'r> {
    /// A handler was found, with the unescaped parameters it captured.
    Found { handler: &'r dyn Handler, params: Vec<(&'r str, String)> },
    /// The path matched a route ending with `/` but lacks the trailing slash.
    AddSlash,
    /// The path matched, no handler is registered for the method.
    MethodNotAllowed,
    /// No route matched, or a captured value failed to unescape.
    NotFound,
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { params, .. } => f.debug_struct("Found").field("params", params).finish_non_exhaustive(),
            Self::AddSlash => f.write_str("AddSlash"),
            Self::MethodNotAllowed => f.write_str("MethodNotAllowed"),
            Self::NotFound => f.write_str("NotFound"),
        }
    }
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Resolves `path` and `method` to a routing outcome.
    pub fn find<'r>(&'r self, path: &str, method: &Method) -> RouteMatch<'r> {
        for route in &self.routes {
            let Some(values) = route.pattern.captures(path) else {
                continue;
            };

            if route.add_slash && !path.ends_with('/') {
                return RouteMatch::AddSlash;
            }

            let mut params = Vec::with_capacity(values.len());
            for (name, value) in route.pattern.names().iter().zip(values) {
                match unescape(value) {
                    Ok(value) => params.push((name.as_str(), value.into_owned())),
                    Err(e) => {
                        debug!(path, pattern = route.pattern.source(), cause = %e, "can't unescape path parameter");
                        return RouteMatch::NotFound;
                    }
                }
            }

            return match route.handlers.resolve(method) {
                Some(handler) => RouteMatch::Found { handler, params },
                None => RouteMatch::MethodNotAllowed,
            };
        }

        RouteMatch::NotFound
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter().map(|route| (route.pattern.source(), &route.handlers))).finish()
    }
}

#[async_trait]
impl Handler for Router {
    async fn call(&self, req: &mut Request<'_>) {
        let route_match = self.find(req.uri().path(), req.method());
        match route_match {
            RouteMatch::Found { handler, params } => {
                trace!(path = req.uri().path(), "route matched");
                for (name, value) in params {
                    req.params_mut().insert(name, value);
                }
                handler.call(req).await;
            }
            RouteMatch::AddSlash => {
                let location = match req.uri().query() {
                    Some(query) if !query.is_empty() => format!("{}/?{}", req.uri().path(), query),
                    _ => format!("{}/", req.uri().path()),
                };
                req.redirect(&location, true).await;
            }
            RouteMatch::MethodNotAllowed => req.error(StatusCode::METHOD_NOT_ALLOWED).await,
            RouteMatch::NotFound => req.error(StatusCode::NOT_FOUND).await,
        }
    }
}

/// Collects routes for a [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: Vec<(String, MethodHandlers)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Routes are matched in the order they are added.
    pub fn route(mut self, pattern: impl Into<String>, handlers: MethodHandlers) -> Self {
        self.routes.push((pattern.into(), handlers));
        self
    }

    /// Compiles every pattern.
    ///
    /// Fails on a pattern not starting with `/`, on a route without
    /// handlers, and on a placeholder whose expression does not compile.
    pub fn build(self) -> Result<Router, RouteError> {
        let routes = self
            .routes
            .into_iter()
            .map(|(pattern, handlers)| {
                if !pattern.starts_with('/') {
                    return Err(RouteError::InvalidPattern { pattern });
                }
                if handlers.is_empty() {
                    return Err(RouteError::NoHandlers { pattern });
                }

                let add_slash = pattern.ends_with('/');
                let pattern = Pattern::compile(&pattern, add_slash, '/')?;
                Ok(Route { pattern, add_slash, handlers })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Router { routes })
    }
}

/// Handlers of one route, keyed by request method.
#[derive(Default)]
pub struct MethodHandlers {
    by_method: HashMap<Method, Box<dyn Handler>>,
    any: Option<Box<dyn Handler>>,
}

impl MethodHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method`, replacing any previous one.
    pub fn on<H: Handler + 'static>(mut self, method: Method, handler: H) -> Self {
        self.by_method.insert(method, Box::new(handler));
        self
    }

    /// Registers the handler used for methods without their own entry.
    pub fn any<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.any = Some(Box::new(handler));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty() && self.any.is_none()
    }

    fn resolve(&self, method: &Method) -> Option<&dyn Handler> {
        self.by_method
            .get(method)
            .or_else(|| if *method == Method::HEAD { self.by_method.get(&Method::GET) } else { None })
            .or(self.any.as_ref())
            .map(|handler| handler.as_ref())
    }
}

impl fmt::Debug for MethodHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods = self.by_method.keys().map(Method::as_str).collect::<Vec<_>>();
        methods.sort_unstable();
        if self.any.is_some() {
            methods.push("*");
        }
        f.debug_struct("MethodHandlers").field("methods", &methods).finish()
    }
}

macro_rules! method_handler {
    ($method:ident, $method_const:ident) => {
        impl MethodHandlers {
            #[doc = concat!("Registers `handler` for `", stringify!($method_const), "`.")]
            pub fn $method<H: Handler + 'static>(self, handler: H) -> Self {
                self.on(Method::$method_const, handler)
            }
        }

        #[doc = concat!("A handler table answering `", stringify!($method_const), "` with `handler`.")]
        pub fn $method<H: Handler + 'static>(handler: H) -> MethodHandlers {
            MethodHandlers::new().$method(handler)
        }
    };
}

method_handler!(get, GET);
method_handler!(post, POST);
method_handler!(put, PUT);
method_handler!(delete, DELETE);
method_handler!(head, HEAD);
method_handler!(patch, PATCH);
method_handler!(options, OPTIONS);

/// A handler table answering `method` with `handler`.
pub fn on<H: Handler + 'static>(method: Method, handler: H) -> MethodHandlers {
    MethodHandlers::new().on(method, handler)
}

/// A handler table answering every method with `handler`.
pub fn any<H: Handler + 'static>(handler: H) -> MethodHandlers {
    MethodHandlers::new().any(handler)
}

#[cfg(test)]
mod tests;
