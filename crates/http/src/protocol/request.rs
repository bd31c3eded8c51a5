//! HTTP request header handling implementation.
//!
//! This module provides the core abstraction for a parsed request head.
//! It wraps the standard `http::Request` type and keeps the protocol
//! major/minor numbers exactly as they appeared on the request line, since
//! the connection engine's keep-alive rules depend on them.

use http::{HeaderMap, Method, Request, Uri, Version, header};

use crate::protocol::ParseError;

/// Represents an HTTP request header.
///
/// This struct wraps a `http::Request<()>` to provide:
/// - Access to standard HTTP header fields
/// - The raw protocol version from the request line
/// - The framing inputs the connection engine derives from headers
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
    major: u32,
    minor: u32,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl RequestHeader {
    /// Builds a header from the pieces of a parsed request line and header block.
    pub fn new(method: Method, uri: Uri, major: u32, minor: u32, headers: HeaderMap) -> Self {
        let mut inner = Request::new(());
        *inner.method_mut() = method;
        *inner.uri_mut() = uri;
        *inner.version_mut() = version_of(major, minor);
        *inner.headers_mut() = headers;
        Self { inner, major, minor }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    ///
    /// Any version at or above 1.1 on the request line maps to
    /// [`Version::HTTP_11`], since this server only speaks HTTP/1.x.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns the `(major, minor)` pair from the request line.
    pub fn protocol_version(&self) -> (u32, u32) {
        (self.major, self.minor)
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// True when the request line declared HTTP/1.1 or later, which enables
    /// persistent connections by default.
    pub fn is_at_least_http11(&self) -> bool {
        self.major > 1 || (self.major == 1 && self.minor >= 1)
    }

    /// Parses the first `Content-Length` value.
    ///
    /// Returns `Ok(None)` when the header is absent.
    pub fn content_length(&self) -> Result<Option<u64>, ParseError> {
        let Some(value) = self.headers().get(header::CONTENT_LENGTH) else {
            return Ok(None);
        };

        let str = value.to_str().map_err(|_e| ParseError::invalid_content_length("value can't to_str"))?;
        let length = str
            .trim()
            .parse::<u64>()
            .map_err(|_e| ParseError::invalid_content_length(format!("value {str} is not u64")))?;

        Ok(Some(length))
    }

    /// True when the client asked for a `100 Continue` interim response.
    pub fn expects_continue(&self) -> bool {
        self.headers().get(header::EXPECT).is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"100-continue"))
    }

    /// True when the client sent `Connection: close`.
    pub fn wants_close(&self) -> bool {
        self.headers().get(header::CONNECTION).is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"close"))
    }
}

/// Converts a bodyless request into a RequestHeader.
impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        let (major, minor) = match inner.version() {
            Version::HTTP_09 => (0, 9),
            Version::HTTP_10 => (1, 0),
            Version::HTTP_2 => (2, 0),
            Version::HTTP_3 => (3, 0),
            _ => (1, 1),
        };
        Self { inner, major, minor }
    }
}

fn version_of(major: u32, minor: u32) -> Version {
    match (major, minor) {
        (0, _) => Version::HTTP_09,
        (1, 0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    }
}
