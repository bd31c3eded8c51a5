//! Pattern routers and a server bootstrap for `twig-http`.
//!
//! - [`Router`] dispatches on the request path and method, using patterns
//!   such as `/user/<id:[0-9]+>`
//! - [`HostRouter`] dispatches on the `Host` header, using patterns such as
//!   `<sub>.example.com`
//! - [`Server`] accepts TCP connections and serves each on its own task
//!
//! Values captured by either router are merged into the request parameters,
//! see [`Request::params`](twig_http::request::Request::params).
//!
//! # Example
//!
//! ```no_run
//! use http::{HeaderMap, StatusCode};
//! use tokio::io::AsyncWriteExt;
//! use twig_http::handler::handler_fn;
//! use twig_web::router::get;
//! use twig_web::{Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder()
//!         .route("/hello/<name>", get(handler_fn(|req| Box::pin(async move {
//!             let text = format!("hello {}\r\n", req.params().get("name").unwrap_or_default());
//!             if let Some(mut body) = req.respond(StatusCode::OK, HeaderMap::new()).await {
//!                 let _ = body.write_all(text.as_bytes()).await;
//!             }
//!         }))))
//!         .build()?;
//!
//!     Server::builder().address("127.0.0.1:8080").handler(router).build()?.start().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod host_router;
mod pattern;
mod server;
mod unescape;

pub mod router;

#[cfg(test)]
mod test_io;

pub use error::{RouteError, UnescapeError};
pub use host_router::{HostRouter, HostRouterBuilder};
pub use pattern::Pattern;
pub use router::{MethodHandlers, RouteMatch, Router, RouterBuilder};
pub use server::{Server, ServerBuildError, ServerBuilder};
pub use unescape::unescape;
