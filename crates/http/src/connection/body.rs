use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::connection::Session;

/// Readable request body.
///
/// Reports end of stream once the declared `Content-Length` has been read.
/// After the response is committed every read fails with a "response started"
/// error, and a failed read replays the same failure on every later call.
#[derive(Debug)]
pub struct ReqBody<'a> {
    session: &'a mut Session,
}

impl<'a> ReqBody<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Bytes of the body not read yet.
    pub fn remaining(&self) -> u64 {
        self.session.request_remaining()
    }
}

impl AsyncRead for ReqBody<'_> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        self.get_mut().session.poll_read_body(cx, buf)
    }
}

/// Writable, flushable response body sink.
///
/// Bytes are buffered and framed according to the decision made when the
/// response was committed. The first write failure is latched and returned
/// by every later call. Shutting the sink down only flushes it; the
/// connection decides when the stream itself is closed.
#[derive(Debug)]
pub struct ResponseBody<'a> {
    session: &'a mut Session,
}

impl<'a> ResponseBody<'a> {
    pub(crate) fn new(session: &'a mut Session) -> Self {
        Self { session }
    }
}

impl AsyncWrite for ResponseBody<'_> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.get_mut().session.poll_write_body(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().session.poll_flush_body(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().session.poll_flush_body(cx)
    }
}
