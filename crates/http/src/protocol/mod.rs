//! Core HTTP protocol abstractions.
//!
//! This module provides the fundamental building blocks shared by the codec
//! and the connection engine.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): payload items fed to body encoders
//!   - [`PayloadItem`]: a data chunk or the end-of-body marker
//!
//! - **Request Processing** ([`request`]): parsed request head
//!   - [`RequestHeader`]: method, target, protocol version and headers
//!
//! - **Response Processing** ([`response`]): response head
//!   - [`ResponseHead`]: Type alias for response headers before body attachment
//!
//! - **Parameters** ([`params`]): values captured by routers
//!   - [`PathParams`]: name to value map merged into each request
//!
//! - **Error Handling** ([`error`]): Comprehensive error types
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors
//!   - [`SessionError`]: misuse of a connection session

mod message;
pub use message::PayloadItem;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;

mod params;
pub use params::PathParams;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::SessionError;
