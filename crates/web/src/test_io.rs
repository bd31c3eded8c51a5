use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use twig_http::connection::HttpConnection;
use twig_http::handler::Handler;

// Replays scripted input, records everything written.
pub(crate) struct MockIO {
    read_data: Vec<u8>,
    read_pos: usize,
    written: Arc<Mutex<Vec<u8>>>,
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

/// Serves `input` (with `\n` turned into CRLF) on one connection and returns
/// everything the server wrote.
pub(crate) async fn serve<H: Handler + 'static>(handler: H, input: &str) -> String {
    let written = Arc::new(Mutex::new(Vec::new()));
    let io = MockIO { read_data: input.replace('\n', "\r\n").into_bytes(), read_pos: 0, written: written.clone() };

    HttpConnection::new(io).process(Arc::new(handler)).await.unwrap();

    let output = written.lock().unwrap().clone();
    String::from_utf8(output).unwrap()
}
