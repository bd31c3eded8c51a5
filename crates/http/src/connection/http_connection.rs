use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::codec::HeadDecoder;
use crate::connection::{ConnectionConfig, Io, Session};
use crate::handler::{DefaultErrorHandler, ErrorHandler, Handler};
use crate::protocol::HttpError;
use crate::request::Request;

/// An HTTP connection that runs request/response cycles over one stream
///
/// `HttpConnection` handles the full lifecycle of an HTTP connection, including:
/// - Reading and decoding request heads
/// - Handing each request to the handler, one at a time
/// - Finalizing the response framing
/// - Deciding whether the stream is reused for another request
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tokio::net::TcpListener;
/// use twig_http::connection::HttpConnection;
/// use twig_http::handler::handler_fn;
///
/// # async fn serve() -> std::io::Result<()> {
/// let listener = TcpListener::bind("127.0.0.1:8080").await?;
/// let handler = Arc::new(handler_fn(|req| Box::pin(async move {
///     req.respond(http::StatusCode::NO_CONTENT, http::HeaderMap::new()).await;
/// })));
///
/// let (stream, _) = listener.accept().await?;
/// let _ = HttpConnection::new(stream).process(handler).await;
/// # Ok(())
/// # }
/// ```
pub struct HttpConnection {
    session: Session,
    decoder: HeadDecoder,
    error_handler: Arc<dyn ErrorHandler>,
}

impl fmt::Debug for HttpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection").field("session", &self.session).field("decoder", &self.decoder).finish_non_exhaustive()
    }
}

impl HttpConnection {
    pub fn new<IO: Io + 'static>(io: IO) -> Self {
        Self::with_config(io, ConnectionConfig::default())
    }

    pub fn with_config<IO: Io + 'static>(io: IO, config: ConnectionConfig) -> Self {
        Self {
            decoder: HeadDecoder::new(config.limits),
            session: Session::new(io, config),
            error_handler: Arc::new(DefaultErrorHandler),
        }
    }

    /// Replaces the error handler installed on every request of this connection.
    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// Serves requests until the connection closes.
    ///
    /// # Errors
    ///
    /// - [`HttpError::RequestError`] when a request head is malformed or the
    ///   stream fails while reading it; no response is sent
    /// - [`HttpError::ResponseError`] when writing a response fails
    ///
    /// A peer closing the stream between requests, a close-after-response
    /// decision and a hijack all end the loop with `Ok(())`.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        loop {
            let header = match self.session.read_head(&mut self.decoder).await {
                Ok(Some(header)) => header,
                Ok(None) => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
                Err(e) => {
                    warn!(cause = %e, "can't receive next request, dropping connection");
                    self.session.shutdown().await;
                    return Err(e.into());
                }
            };

            let content_length = match self.session.begin(&header) {
                Ok(content_length) => content_length,
                Err(e) => {
                    warn!(cause = %e, "bad request framing, dropping connection");
                    self.session.shutdown().await;
                    return Err(e.into());
                }
            };

            {
                let mut request = Request::new(header, content_length, Arc::clone(&self.error_handler), &mut self.session);
                handler.call(&mut request).await;
            }

            if self.session.is_hijacked() {
                info!("connection hijacked, engine released the stream");
                return Ok(());
            }

            if let Err(e) = self.session.finish().await {
                error!(cause = %e, "can't send response, connection shutdown");
                self.session.shutdown().await;
                return Err(e.into());
            }

            if self.session.close_after_response() {
                debug!("close after response");
                self.session.shutdown().await;
                return Ok(());
            }
        }
    }
}
