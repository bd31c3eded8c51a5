//! HTTP request head decoder
//!
//! This module turns raw bytes into a [`RequestHeader`]: the request line
//! followed by a block of header lines terminated by an empty line.
//!
//! # Grammar
//!
//! - Request line: `METHOD SP TARGET SP "HTTP/" MAJOR "." MINOR`, where the
//!   method is `[A-Za-z0-9_]+` and is stored upper-cased
//! - Header line: a token key, optional whitespace, `:`, then the value with
//!   surrounding whitespace trimmed
//! - Continuation line: starts with whitespace and is folded into the last
//!   value of the most recent header, joined by one space
//! - Lines may end with either CRLF or a bare LF
//!
//! # Limits
//!
//! Violations are errors, never silent truncation. See [`HeadLimits`].
//!
//! # Implementation Details
//!
//! The decoder scans complete lines incrementally, so a head that arrives in
//! many small reads is not rescanned from the start on each call. Line length
//! and header count are enforced while scanning; the head is split off the
//! buffer and parsed in one pass once the terminating empty line is seen.

use bytes::BytesMut;
use http::header::Entry;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RequestHeader};
use crate::utils::{is_space_byte, is_token_byte, trim_ws, trim_ws_left, trim_ws_right};

/// Size limits applied while reading a request head.
///
/// The defaults cap the memory a single request head may use regardless of
/// what the peer sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadLimits {
    /// Maximum length of one line, request line included, without its terminator.
    pub max_line_size: usize,
    /// Maximum length of one header value after continuation folding.
    pub max_value_size: usize,
    /// Maximum number of header lines, continuation lines excluded.
    pub max_header_count: usize,
}

impl Default for HeadLimits {
    fn default() -> Self {
        Self { max_line_size: 4096, max_value_size: 4096, max_header_count: 256 }
    }
}

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
///
/// Bytes following the head (the request body, or the next request) are left
/// untouched in the source buffer.
#[derive(Debug, Clone)]
pub struct HeadDecoder {
    limits: HeadLimits,
    /// Offset just past the last complete line seen in the current head.
    scanned: usize,
    header_count: usize,
}

impl Default for HeadDecoder {
    fn default() -> Self {
        Self::new(HeadLimits::default())
    }
}

impl HeadDecoder {
    pub fn new(limits: HeadLimits) -> Self {
        Self { limits, scanned: 0, header_count: 0 }
    }

    pub fn limits(&self) -> &HeadLimits {
        &self.limits
    }

    fn reset(&mut self) {
        self.scanned = 0;
        self.header_count = 0;
    }

    fn parse_head(&self, head: &[u8]) -> Result<RequestHeader, ParseError> {
        let mut lines = head.split(|b| *b == b'\n').map(strip_cr);

        let request_line = lines.next().ok_or(ParseError::MalformedRequestLine)?;
        let (method, uri, major, minor) = parse_request_line(request_line)?;
        trace!(%method, %uri, major, minor, "parsed request line");

        let mut headers = HeaderMap::with_capacity(self.header_count);
        let mut last_name: Option<HeaderName> = None;

        for line in lines {
            if line.is_empty() {
                break;
            }

            if is_space_byte(line[0]) {
                let name = last_name.as_ref().ok_or(ParseError::ContinuationBeforeHeader)?;
                self.fold_continuation(&mut headers, name, trim_ws(line))?;
                continue;
            }

            let key_len = line.iter().position(|b| !is_token_byte(*b)).unwrap_or(line.len());
            ensure!(key_len > 0, ParseError::invalid_header("missing header key"));

            let name = HeaderName::from_bytes(&line[..key_len]).map_err(ParseError::invalid_header)?;

            let rest = trim_ws_left(&line[key_len..]);
            let Some((&b':', value)) = rest.split_first() else {
                return Err(ParseError::invalid_header(format!("header {name} missing ':'")));
            };

            let value = HeaderValue::from_bytes(trim_ws(value)).map_err(ParseError::invalid_header)?;
            headers.append(name.clone(), value);
            last_name = Some(name);
        }

        Ok(RequestHeader::new(method, uri, major, minor, headers))
    }

    fn fold_continuation(&self, headers: &mut HeaderMap, name: &HeaderName, extra: &[u8]) -> Result<(), ParseError> {
        if extra.is_empty() {
            return Ok(());
        }

        let Entry::Occupied(mut entry) = headers.entry(name) else {
            return Err(ParseError::ContinuationBeforeHeader);
        };
        let Some(last) = entry.iter_mut().next_back() else {
            return Err(ParseError::ContinuationBeforeHeader);
        };

        let current = last.as_bytes();
        let folded_size = current.len() + 1 + extra.len();
        ensure!(
            folded_size <= self.limits.max_value_size,
            ParseError::too_long_value(folded_size, self.limits.max_value_size)
        );

        let mut folded = Vec::with_capacity(folded_size);
        folded.extend_from_slice(current);
        folded.push(b' ');
        folded.extend_from_slice(extra);

        *last = HeaderValue::from_bytes(&folded).map_err(ParseError::invalid_header)?;
        Ok(())
    }
}

impl Decoder for HeadDecoder {
    type Item = RequestHeader;
    type Error = ParseError;

    /// Attempts to decode a request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(header))` if a complete head was parsed and split off `src`
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the head is malformed or exceeds a limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let max_line_size = self.limits.max_line_size;

        loop {
            let Some(offset) = src[self.scanned..].iter().position(|b| *b == b'\n') else {
                // the unterminated tail may still gain its CRLF
                let pending = src.len() - self.scanned;
                ensure!(pending <= max_line_size + 2, ParseError::too_long_line(pending, max_line_size));
                return Ok(None);
            };

            let line_start = self.scanned;
            let line = strip_cr(&src[line_start..line_start + offset]);
            self.scanned = line_start + offset + 1;

            ensure!(line.len() <= max_line_size, ParseError::too_long_line(line.len(), max_line_size));

            if line_start == 0 {
                continue;
            }

            if line.is_empty() {
                let head = src.split_to(self.scanned);
                trace!(head_size = head.len(), header_count = self.header_count, "request head complete");
                let result = self.parse_head(&head);
                self.reset();
                return result.map(Some);
            }

            if !is_space_byte(line[0]) {
                self.header_count += 1;
                ensure!(
                    self.header_count <= self.limits.max_header_count,
                    ParseError::too_many_headers(self.limits.max_header_count)
                );
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(header) => Ok(Some(header)),
            None if buf.is_empty() => Ok(None),
            None => Err(ParseError::Incomplete),
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_request_line(line: &[u8]) -> Result<(Method, Uri, u32, u32), ParseError> {
    let line = trim_ws_right(line);

    let mut parts = line.splitn(3, |b| *b == b' ');
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::MalformedRequestLine);
    };
    ensure!(!target.is_empty(), ParseError::MalformedRequestLine);

    ensure!(
        !method.is_empty() && method.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_'),
        ParseError::InvalidMethod
    );
    let method = Method::from_bytes(&method.to_ascii_uppercase()).map_err(|_| ParseError::InvalidMethod)?;

    let uri = Uri::try_from(target).map_err(|_| ParseError::InvalidUri)?;

    let (major, minor) = parse_version(version)?;

    Ok((method, uri, major, minor))
}

fn parse_version(version: &[u8]) -> Result<(u32, u32), ParseError> {
    let invalid = || ParseError::invalid_version(String::from_utf8_lossy(version));

    let numbers = version.strip_prefix(b"HTTP/").ok_or_else(invalid)?;
    let dot = numbers.iter().position(|b| *b == b'.').ok_or_else(invalid)?;
    let (major, minor) = (&numbers[..dot], &numbers[dot + 1..]);

    let parse = |digits: &[u8]| -> Option<u32> {
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }
        std::str::from_utf8(digits).ok()?.parse().ok()
    };

    match (parse(major), parse(minor)) {
        (Some(major), Some(minor)) => Ok((major, minor)),
        _ => Err(invalid()),
    }
}
