//! HTTP response header handling implementation.
//!
//! This module provides type definitions for HTTP response headers.
//! It uses the standard `http::Response` type with an empty body placeholder
//! to represent the status line and header block before any body bytes are written.

use http::Response;

/// Type alias for HTTP response headers.
///
/// The version carried by the head decides the status line protocol
/// (`HTTP/1.0` or `HTTP/1.1`).
pub type ResponseHead = Response<()>;
