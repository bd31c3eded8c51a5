//! The request handed to application handlers.
//!
//! A [`Request`] is the narrow capability an application gets over its
//! connection: it can read the body, commit a response exactly once and take
//! the stream over, nothing else.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, Version, header};
use tokio::io::AsyncReadExt;
use tracing::error;

use crate::connection::{Hijacked, ReqBody, ResponseBody, Session};
use crate::handler::ErrorHandler;
use crate::protocol::{PathParams, RequestHeader, SessionError};

/// One parsed request, bound to the connection serving it.
pub struct Request<'conn> {
    header: RequestHeader,
    content_length: Option<u64>,
    params: PathParams,
    error_handler: Arc<dyn ErrorHandler>,
    session: &'conn mut Session,
}

impl std::fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("header", &self.header)
            .field("content_length", &self.content_length)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<'conn> Request<'conn> {
    pub(crate) fn new(
        header: RequestHeader,
        content_length: Option<u64>,
        error_handler: Arc<dyn ErrorHandler>,
        session: &'conn mut Session,
    ) -> Self {
        Self { header, content_length, params: PathParams::empty(), error_handler, session }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn method(&self) -> &Method {
        self.header.method()
    }

    pub fn uri(&self) -> &Uri {
        self.header.uri()
    }

    pub fn version(&self) -> Version {
        self.header.version()
    }

    /// The `(major, minor)` pair from the request line.
    pub fn protocol_version(&self) -> (u32, u32) {
        self.header.protocol_version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.header.headers()
    }

    /// The declared body length, `None` when the request has no `Content-Length`.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// The `Host` header, or the authority of an absolute-form target.
    pub fn host(&self) -> Option<&str> {
        self.headers()
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| self.uri().authority().map(|authority| authority.as_str()))
    }

    /// Parameters captured by routers.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut PathParams {
        &mut self.params
    }

    pub fn error_handler(&self) -> &Arc<dyn ErrorHandler> {
        &self.error_handler
    }

    /// Replaces the handler used by [`Request::error`] for this request.
    pub fn set_error_handler(&mut self, error_handler: Arc<dyn ErrorHandler>) {
        self.error_handler = error_handler;
    }

    /// The request body.
    pub fn body(&mut self) -> ReqBody<'_> {
        ReqBody::new(self.session)
    }

    /// Reads the whole body.
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] when the declared length
    /// exceeds `max_len`.
    pub async fn read_body(&mut self, max_len: usize) -> io::Result<Bytes> {
        let declared = self.content_length.unwrap_or(0);
        if declared > max_len as u64 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request body too large"));
        }

        let mut buf = Vec::with_capacity(declared as usize);
        self.body().read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    /// Commits the response status and headers.
    ///
    /// Returns the body sink, or `None` when a response was already committed
    /// or the connection was hijacked. Both cases are logged.
    pub async fn respond(&mut self, status: StatusCode, headers: HeaderMap) -> Option<ResponseBody<'_>> {
        if self.session.respond(status, headers).await { Some(ResponseBody::new(self.session)) } else { None }
    }

    pub fn is_response_started(&self) -> bool {
        self.session.is_response_started()
    }

    /// Takes the stream over. The engine will not read, write, finalize or
    /// close it afterwards.
    pub fn hijack(&mut self) -> Result<Hijacked, SessionError> {
        self.session.hijack()
    }

    /// Responds through the request's error handler.
    pub async fn error(&mut self, status: StatusCode) {
        self.error_with_headers(status, HeaderMap::new()).await;
    }

    /// Like [`Request::error`], with extra response headers.
    pub async fn error_with_headers(&mut self, status: StatusCode, headers: HeaderMap) {
        let error_handler = Arc::clone(&self.error_handler);
        error_handler.handle(self, status, headers).await;
    }

    /// Responds with a `301` (permanent) or `302` redirect.
    ///
    /// A relative `location` is resolved against the directory of the
    /// current request path.
    pub async fn redirect(&mut self, location: &str, permanent: bool) {
        let status = if permanent { StatusCode::MOVED_PERMANENTLY } else { StatusCode::FOUND };
        let location = resolve_location(self.uri().path(), location);

        let value = match HeaderValue::from_str(&location) {
            Ok(value) => value,
            Err(e) => {
                error!(%location, cause = %e, "invalid redirect location");
                self.error(StatusCode::INTERNAL_SERVER_ERROR).await;
                return;
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, value);
        self.respond(status, headers).await;
    }
}

fn resolve_location(path: &str, location: &str) -> String {
    let has_scheme = location.find("://").is_some_and(|i| {
        let scheme = &location[..i];
        !scheme.is_empty() && scheme.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    });
    if location.starts_with('/') || has_scheme {
        return location.to_string();
    }

    let dir = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    };
    format!("{dir}{location}")
}
