//! Per-connection protocol state.
//!
//! A [`Session`] owns the stream of one accepted connection and carries the
//! state of the request/response cycle currently in flight. The
//! [`HttpConnection`](super::HttpConnection) loop drives it through
//! `read_head -> begin -> (handler) -> finish`; applications only reach it
//! through a [`Request`](crate::request::Request).

use std::fmt;
use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Version, header};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};
use tokio_util::io::{poll_read_buf, poll_write_buf};
use tracing::{debug, error, trace, warn};

use crate::codec::{HeadDecoder, HeaderEncoder, PayloadEncoder};
use crate::connection::ConnectionConfig;
use crate::protocol::{ParseError, PayloadItem, RequestHeader, ResponseHead, SendError, SessionError};

const CONTINUE_RESPONSE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// A bidirectional byte stream the engine can serve.
pub trait Io: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Io for T {}

/// The stream handed to an application that took over a connection.
pub struct Hijacked {
    /// The underlying stream. The engine will never touch it again.
    pub io: Box<dyn Io>,
    /// Bytes already read from the stream but not consumed by the engine.
    pub buffered: Bytes,
}

impl fmt::Debug for Hijacked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hijacked").field("buffered", &self.buffered).finish_non_exhaustive()
    }
}

/// An I/O failure kept so it can be replayed on every later call.
#[derive(Debug, Clone)]
struct Latched {
    kind: io::ErrorKind,
    message: String,
}

impl Latched {
    fn new(e: &io::Error) -> Self {
        Self { kind: e.kind(), message: e.to_string() }
    }

    fn to_io(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }
}

#[derive(Debug, Clone)]
enum ReadState {
    Open,
    Failed(Latched),
}

#[derive(Debug, Clone)]
enum WriteState {
    Open,
    Failed(Latched),
}

fn hijacked_error() -> io::Error {
    io::Error::other(SessionError::Hijacked)
}

/// State of one accepted connection.
pub struct Session {
    io: Option<Box<dyn Io>>,
    config: ConnectionConfig,
    read_buf: BytesMut,

    at_least_http11: bool,
    close_after_response: bool,
    hijacked: bool,
    head_request: bool,

    // request side
    request_remaining: u64,
    read_state: ReadState,
    write_100_continue: bool,
    continue_in_flight: bool,

    // response side
    respond_called: bool,
    chunked: bool,
    declared_length: Option<u64>,
    encoder: Option<PayloadEncoder>,
    /// body bytes not yet framed
    pending: BytesMut,
    /// framed bytes not yet written to the stream
    out: BytesMut,
    write_state: WriteState,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("at_least_http11", &self.at_least_http11)
            .field("close_after_response", &self.close_after_response)
            .field("hijacked", &self.hijacked)
            .field("request_remaining", &self.request_remaining)
            .field("respond_called", &self.respond_called)
            .field("chunked", &self.chunked)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new<IO: Io + 'static>(io: IO, config: ConnectionConfig) -> Self {
        Self {
            io: Some(Box::new(io)),
            config,
            read_buf: BytesMut::with_capacity(config.read_buffer_size.max(1)),
            at_least_http11: false,
            close_after_response: false,
            hijacked: false,
            head_request: false,
            request_remaining: 0,
            read_state: ReadState::Open,
            write_100_continue: false,
            continue_in_flight: false,
            respond_called: false,
            chunked: false,
            declared_length: None,
            encoder: None,
            pending: BytesMut::new(),
            out: BytesMut::new(),
            write_state: WriteState::Open,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// True once the connection will be closed after the current response.
    pub fn close_after_response(&self) -> bool {
        self.close_after_response
    }

    pub fn is_hijacked(&self) -> bool {
        self.hijacked
    }

    /// True once a response head has been committed for the current request.
    pub fn is_response_started(&self) -> bool {
        self.respond_called
    }

    /// Bytes of the request body not read yet.
    pub fn request_remaining(&self) -> u64 {
        self.request_remaining
    }

    /// Reads the next request head.
    ///
    /// Returns `Ok(None)` when the peer closed the stream between requests.
    pub(crate) async fn read_head(&mut self, decoder: &mut HeadDecoder) -> Result<Option<RequestHeader>, ParseError> {
        loop {
            if let Some(header) = decoder.decode(&mut self.read_buf)? {
                return Ok(Some(header));
            }

            let io = self.io.as_mut().ok_or_else(|| ParseError::io(hijacked_error()))?;
            self.read_buf.reserve(self.config.read_buffer_size.max(1));
            let read = io.read_buf(&mut self.read_buf).await?;
            trace!(read, buffered = self.read_buf.len(), "read request head bytes");

            if read == 0 {
                return decoder.decode_eof(&mut self.read_buf);
            }
        }
    }

    /// Resets per-request state for a freshly parsed head and derives the
    /// framing inputs. Returns the declared request body length.
    pub(crate) fn begin(&mut self, header: &RequestHeader) -> Result<Option<u64>, ParseError> {
        let content_length = header.content_length()?;

        self.request_remaining = content_length.unwrap_or(0);
        self.read_state = ReadState::Open;
        self.write_100_continue = header.expects_continue();
        self.continue_in_flight = false;
        self.head_request = header.method() == Method::HEAD;

        self.respond_called = false;
        self.chunked = false;
        self.declared_length = None;
        self.encoder = None;
        self.pending.clear();
        self.out.clear();
        self.write_state = WriteState::Open;

        self.at_least_http11 = header.is_at_least_http11();
        if !self.at_least_http11 {
            debug!(version = ?header.protocol_version(), "http/1.0 request, close after response");
            self.close_after_response = true;
        } else if header.wants_close() {
            debug!("client requested connection close");
            self.close_after_response = true;
        }

        if header.headers().contains_key(header::TRANSFER_ENCODING) {
            debug!("request body uses transfer-encoding, close after response");
            self.close_after_response = true;
        }

        Ok(content_length)
    }

    fn fail_read(&mut self, e: io::Error) -> Poll<io::Result<()>> {
        warn!(cause = %e, "request body read failed");
        self.read_state = ReadState::Failed(Latched::new(&e));
        Poll::Ready(Err(e))
    }

    /// Reads request body bytes into `buf`, bounded by the declared length.
    pub(crate) fn poll_read_body(&mut self, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        if let ReadState::Failed(latched) = &self.read_state {
            return Poll::Ready(Err(latched.to_io()));
        }

        if self.write_100_continue {
            self.write_100_continue = false;
            self.continue_in_flight = true;
            self.out.extend_from_slice(CONTINUE_RESPONSE);
        }

        if self.continue_in_flight {
            if let Err(e) = ready!(self.poll_write_out(cx)) {
                return self.fail_read(e);
            }
            if let Err(e) = ready!(self.poll_flush_io(cx)) {
                return self.fail_read(e);
            }
            self.continue_in_flight = false;
            debug!("sent 100 continue");
        }

        if self.request_remaining == 0 || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        if self.read_buf.is_empty() {
            let Some(io) = self.io.as_mut() else {
                return self.fail_read(hijacked_error());
            };
            self.read_buf.reserve(self.config.read_buffer_size.max(1));
            match ready!(poll_read_buf(Pin::new(io), cx, &mut self.read_buf)) {
                Ok(0) => {
                    let e = io::Error::new(io::ErrorKind::UnexpectedEof, "stream closed before request body was complete");
                    return self.fail_read(e);
                }
                Ok(_) => {}
                Err(e) => return self.fail_read(e),
            }
        }

        let available = usize::try_from(self.request_remaining).unwrap_or(usize::MAX);
        let size = self.read_buf.len().min(available).min(buf.remaining());
        buf.put_slice(&self.read_buf.split_to(size));
        self.request_remaining -= size as u64;

        Poll::Ready(Ok(()))
    }

    /// Commits the response head.
    ///
    /// Returns `false`, without touching the stream, when a response was
    /// already committed or the connection was hijacked.
    pub(crate) async fn respond(&mut self, status: StatusCode, mut headers: HeaderMap) -> bool {
        if self.hijacked {
            error!(%status, "respond called on hijacked connection");
            return false;
        }
        if self.respond_called {
            error!(%status, "multiple calls to respond");
            return false;
        }
        self.respond_called = true;
        self.read_state = ReadState::Failed(Latched {
            kind: io::ErrorKind::Other,
            message: "response started".to_string(),
        });

        let mut chunked = true;

        if self.request_remaining > 0 {
            debug!(remaining = self.request_remaining, "request body not fully read, close after response");
            self.close_after_response = true;
        }

        if status == StatusCode::NOT_MODIFIED {
            headers.remove(header::CONTENT_TYPE);
            headers.remove(header::TRANSFER_ENCODING);
            chunked = false;
        }

        if self.close_after_response {
            headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
            chunked = false;
        }

        self.declared_length = None;
        if let Some(value) = headers.get(header::CONTENT_LENGTH) {
            let length = value.to_str().ok().and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0);
            self.declared_length = Some(length);
            chunked = false;
        }

        if headers.contains_key(header::TRANSFER_ENCODING) {
            chunked = false;
        }

        if chunked {
            headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        }
        self.chunked = chunked;

        let mut head = ResponseHead::new(());
        *head.status_mut() = status;
        *head.version_mut() = if self.at_least_http11 { Version::HTTP_11 } else { Version::HTTP_10 };
        *head.headers_mut() = headers;

        if let Err(e) = HeaderEncoder.encode(&head, &mut self.out) {
            self.fail_write(send_error_to_io(e));
        }

        self.encoder = Some(if self.head_request {
            PayloadEncoder::discard()
        } else if chunked {
            PayloadEncoder::chunked()
        } else {
            PayloadEncoder::identity(self.declared_length)
        });

        debug!(%status, chunked, declared_length = ?self.declared_length, close = self.close_after_response, "response committed");

        // chunk framing starts after the head, so the head goes out on its own
        if chunked && matches!(self.write_state, WriteState::Open) {
            if let Err(e) = poll_fn(|cx| self.poll_write_out(cx)).await {
                self.fail_write(e);
            }
        }

        true
    }

    fn fail_write(&mut self, e: io::Error) -> io::Error {
        if matches!(self.write_state, WriteState::Open) {
            warn!(cause = %e, "response write failed");
            self.write_state = WriteState::Failed(Latched::new(&e));
        }
        e
    }

    fn check_write(&self) -> io::Result<()> {
        match &self.write_state {
            WriteState::Open if self.encoder.is_some() => Ok(()),
            WriteState::Open => Err(io::Error::other(SendError::BodyClosed)),
            WriteState::Failed(latched) => Err(latched.to_io()),
        }
    }

    /// Writes `out` to the stream until it is empty.
    fn poll_write_out(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while !self.out.is_empty() {
            let Some(io) = self.io.as_mut() else {
                return Poll::Ready(Err(hijacked_error()));
            };
            let written = ready!(poll_write_buf(Pin::new(io), cx, &mut self.out))?;
            if written == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
        }
        Poll::Ready(Ok(()))
    }

    fn poll_flush_io(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.io.as_mut() {
            Some(io) => Pin::new(io).poll_flush(cx),
            None => Poll::Ready(Err(hijacked_error())),
        }
    }

    /// Writes already framed output, latching any failure.
    fn poll_settle_out(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match ready!(self.poll_write_out(cx)) {
            Ok(()) => Poll::Ready(Ok(())),
            Err(e) => Poll::Ready(Err(self.fail_write(e))),
        }
    }

    /// Frames the buffered body bytes and writes everything pending.
    ///
    /// Output framed by an earlier call is written out before a new chunk is
    /// framed, so `out` never holds more than one chunk.
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.check_write()?;
        ready!(self.poll_settle_out(cx))?;

        if !self.pending.is_empty() {
            let chunk = self.pending.split().freeze();
            if let Some(encoder) = self.encoder.as_mut() {
                if let Err(e) = encoder.encode(PayloadItem::Chunk(chunk), &mut self.out) {
                    return Poll::Ready(Err(self.fail_write(send_error_to_io(e))));
                }
            }
        }

        self.poll_settle_out(cx)
    }

    /// Buffers body bytes, draining first when the buffer is full.
    ///
    /// Pending until output framed earlier has reached the stream, so a slow
    /// peer holds the writer back.
    pub(crate) fn poll_write_body(&mut self, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.check_write()?;
        ready!(self.poll_settle_out(cx))?;

        let capacity = self.config.write_buffer_size.max(1);
        if self.pending.len() >= capacity {
            ready!(self.poll_drain(cx))?;
        }

        let size = buf.len().min(capacity - self.pending.len());
        self.pending.extend_from_slice(&buf[..size]);
        Poll::Ready(Ok(size))
    }

    pub(crate) fn poll_flush_body(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        ready!(self.poll_drain(cx))?;
        match ready!(self.poll_flush_io(cx)) {
            Ok(()) => Poll::Ready(Ok(())),
            Err(e) => Poll::Ready(Err(self.fail_write(e))),
        }
    }

    /// Finalizes the current response.
    ///
    /// Commits a default `200 OK` if the application never responded, flushes
    /// the buffered body and writes the chunk terminator when chunked framing
    /// is in use.
    pub(crate) async fn finish(&mut self) -> Result<(), SendError> {
        if !self.respond_called {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
            self.respond(StatusCode::OK, headers).await;
        }

        if !self.chunked && self.declared_length.is_some_and(|length| length != 0) {
            debug!(declared_length = ?self.declared_length, "length declared response, close after response");
            self.close_after_response = true;
        }

        if matches!(self.write_state, WriteState::Open) {
            if let Err(e) = poll_fn(|cx| self.poll_drain(cx)).await {
                trace!(cause = %e, "final body drain failed");
            }
        }

        if matches!(self.write_state, WriteState::Open) {
            if let Some(encoder) = self.encoder.as_mut() {
                if let Some(remaining) = encoder.remaining().filter(|remaining| *remaining != 0) {
                    debug!(remaining, "response body length differs from content-length");
                }
                if let Err(e) = encoder.encode(PayloadItem::<Bytes>::Eof, &mut self.out) {
                    self.fail_write(send_error_to_io(e));
                }
            }
        }

        if matches!(self.write_state, WriteState::Open) {
            if let Err(e) = poll_fn(|cx| self.poll_write_out(cx)).await {
                self.fail_write(e);
            } else if let Err(e) = poll_fn(|cx| self.poll_flush_io(cx)).await {
                self.fail_write(e);
            }
        }

        self.encoder = None;

        match &self.write_state {
            WriteState::Open => Ok(()),
            WriteState::Failed(latched) => Err(SendError::io(latched.to_io())),
        }
    }

    /// Hands the stream and any buffered bytes over to the caller.
    ///
    /// Output that was buffered but not written yet is discarded.
    pub fn hijack(&mut self) -> Result<Hijacked, SessionError> {
        if self.hijacked {
            return Err(SessionError::Hijacked);
        }
        let io = self.io.take().ok_or(SessionError::Hijacked)?;
        self.hijacked = true;
        self.encoder = None;
        debug!(buffered = self.read_buf.len(), "connection hijacked");

        Ok(Hijacked { io, buffered: self.read_buf.split().freeze() })
    }

    /// Shuts down the write side of the stream.
    pub(crate) async fn shutdown(&mut self) {
        if let Some(io) = self.io.as_mut() {
            if let Err(e) = io.shutdown().await {
                debug!(cause = %e, "shutdown connection failed");
            }
        }
    }
}

fn send_error_to_io(e: SendError) -> io::Error {
    match e {
        SendError::Io { source } => source,
        other => io::Error::other(other),
    }
}
