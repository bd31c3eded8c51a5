//! HTTP header encoder implementation for serializing HTTP response headers
//!
//! This module provides functionality for encoding HTTP response heads into raw bytes.
//! Framing decisions (`Content-Length`, `Transfer-Encoding`, `Connection`) are made
//! by the connection engine before encoding, so the encoder writes the header set
//! exactly as given.

use crate::protocol::{ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{StatusCode, Version};
use std::io;
use std::io::{ErrorKind, Write};
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
///
/// Writes the status line, one `Name: value` line per header value (values of
/// the same name keep their insertion order) and the terminating blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<&ResponseHead> for HeaderEncoder {
    type Error = SendError;

    /// Encodes an HTTP response head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the head carries a version other than HTTP/1.0 or HTTP/1.1
    fn encode(&mut self, head: &ResponseHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let protocol = match head.version() {
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_10 => "HTTP/1.0",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        };

        dst.reserve(INIT_HEADER_SIZE);
        write_status_line(dst, protocol, head.status())?;

        for (header_name, header_value) in head.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

fn write_status_line(dst: &mut BytesMut, protocol: &str, status: StatusCode) -> io::Result<()> {
    match status.canonical_reason() {
        Some(reason) => write!(FastWrite(dst), "{protocol} {} {reason}\r\n", status.as_str()),
        None => write!(FastWrite(dst), "{protocol} {0} status code {0}\r\n", status.as_str()),
    }
}

/// Human readable text for a status code.
///
/// Falls back to `status code N` for codes without a canonical reason.
pub fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("status code {}", status.as_u16()),
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    /// Writes a buffer into this writer, returning how many bytes were written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    /// Flush this output stream, ensuring that all intermediately buffered contents reach their destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
