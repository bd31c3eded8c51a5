//! HTTP connection handling module
//!
//! This module owns the per-connection protocol state machine: one request
//! head is parsed, handed to the application, and the response is finalized
//! before the next head is read.
//!
//! # Components
//!
//! - [`HttpConnection`]: Main connection loop that:
//!   - Processes incoming requests, strictly one at a time
//!   - Supports keep-alive connections
//!   - Closes after the response when the protocol requires it
//! - [`Session`]: state of the current request/response cycle
//! - [`ReqBody`] / [`ResponseBody`]: the request body reader and response body
//!   sink handed out through a [`Request`](crate::request::Request)
//! - [`ConnectionConfig`]: limits and buffer sizes
//!
//! # Framing
//!
//! When a response is committed the engine picks its framing, in this order:
//!
//! 1. unread request body forces close after the response
//! 2. `304 Not Modified` drops `Content-Type` and `Transfer-Encoding` and is
//!    sent without body framing
//! 3. a connection that closes after the response gets `Connection: close`
//!    and identity framing
//! 4. a caller supplied `Content-Length` or `Transfer-Encoding` means
//!    identity framing
//! 5. otherwise the body is sent chunked

mod body;
mod config;
mod http_connection;
mod session;

pub use body::ReqBody;
pub use body::ResponseBody;
pub use config::ConnectionConfig;
pub use http_connection::HttpConnection;
pub use session::Hijacked;
pub use session::Io;
pub use session::Session;
