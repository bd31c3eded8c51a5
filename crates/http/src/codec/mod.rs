//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module holds the wire-format pieces used by the connection engine.
//! They are plain `tokio_util` codecs and do no I/O of their own.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`HeadDecoder`]: Decodes the request line and header block
//!   - [`HeadLimits`]: Size limits applied while decoding
//!
//! - Response handling:
//!   - [`HeaderEncoder`]: Encodes the status line and header block
//!   - [`PayloadEncoder`]: Frames body bytes as identity or chunked
//!
//! # Example
//!
//! ```
//! use twig_http::codec::HeadDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = HeadDecoder::default();
//! let mut buffer = BytesMut::from("GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! let header = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(header.uri().path(), "/hello");
//! ```

mod body;
mod header;

pub use body::ChunkedEncoder;
pub use body::IdentityEncoder;
pub use body::PayloadEncoder;
pub use header::HeadDecoder;
pub use header::HeadLimits;
pub use header::HeaderEncoder;
pub use header::status_text;
