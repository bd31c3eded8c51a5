use thiserror::Error;

/// Errors raised while registering routes.
///
/// These are configuration errors: a router that fails to build never serves
/// a request.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("route pattern `{pattern}` must begin with '/'")]
    InvalidPattern { pattern: String },

    #[error("route pattern `{pattern}` has no handlers")]
    NoHandlers { pattern: String },

    #[error("route pattern `{pattern}` does not compile: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RouteError {
    pub(crate) fn invalid_regex(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRegex { pattern: pattern.into(), source }
    }
}

/// Errors from [`unescape`](crate::unescape).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnescapeError {
    #[error("invalid escape at byte {position}")]
    InvalidEscape { position: usize },

    #[error("unescaped value is not valid utf-8")]
    InvalidUtf8,
}
