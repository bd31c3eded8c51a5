//! An asynchronous HTTP/1.x server engine
//!
//! This crate owns the byte stream of an accepted connection: it parses request
//! heads with strict size limits, hands each request to a handler, frames the
//! response as identity or chunked, and decides whether the stream is reused.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 request parsing with continuation line folding
//! - Asynchronous I/O using tokio
//! - Streaming request and response bodies
//! - Chunked transfer encoding
//! - Keep-alive connections
//! - Expect-continue mechanism
//! - Connection takeover (hijack)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use http::{HeaderMap, StatusCode};
//! use tokio::io::AsyncWriteExt;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use twig_http::connection::HttpConnection;
//! use twig_http::handler::handler_fn;
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(handler_fn(|req| Box::pin(async move {
//!         info!(path = req.uri().path(), "request");
//!         if let Some(mut body) = req.respond(StatusCode::OK, HeaderMap::new()).await {
//!             let _ = body.write_all(b"Hello World!\r\n").await;
//!         }
//!     })));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             if let Err(e) = HttpConnection::new(tcp_stream).process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: the per-connection protocol engine
//! - [`protocol`]: protocol types and errors
//! - [`codec`]: head decoding, head encoding and body framing
//! - [`handler`]: handler and error handler traits
//! - [`request`]: the request handed to handlers
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type returned by a connection
//! - [`protocol::ParseError`]: Request parsing errors, always fatal to the connection
//! - [`protocol::SendError`]: Response sending errors
//!
//! # Limitations
//!
//! - HTTP/1.x only
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Chunked request bodies are not decoded; such requests close the connection
//! - One request in flight per connection, no pipelining

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod request;

mod utils;
pub(crate) use utils::ensure;
