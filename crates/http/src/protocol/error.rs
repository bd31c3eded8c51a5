use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Failures while reading a request head.
///
/// Every variant is fatal to the connection: the engine drops the stream
/// without attempting a response.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("invalid http version: {version}")]
    InvalidVersion { version: String },

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http uri")]
    InvalidUri,

    #[error("header line too long, current: {current_size} exceed the limit {max_size}")]
    TooLongLine { current_size: usize, max_size: usize },

    #[error("header value too long, current: {current_size} exceed the limit {max_size}")]
    TooLongValue { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("header continuation before first header")]
    ContinuationBeforeHeader,

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("stream ended before the request head was complete")]
    Incomplete,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_long_line(current_size: usize, max_size: usize) -> Self {
        Self::TooLongLine { current_size, max_size }
    }

    pub fn too_long_value(current_size: usize, max_size: usize) -> Self {
        Self::TooLongValue { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_version<S: ToString>(str: S) -> Self {
        Self::InvalidVersion { version: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if the head was rejected because it exceeded one of the
    /// configured size limits.
    pub fn is_size_limit(&self) -> bool {
        matches!(self, Self::TooLongLine { .. } | Self::TooLongValue { .. } | Self::TooManyHeaders { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("response body closed")]
    BodyClosed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Misuse of a [`Session`](crate::connection::Session) that can be reported
/// back to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("connection has already been hijacked")]
    Hijacked,
}
