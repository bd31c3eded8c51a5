//! HTTP header processing module for encoding and decoding headers
//!
//! # Components
//!
//! - [`HeadDecoder`]: Decodes the request line and header block from raw bytes
//!   - Continuation line folding
//!   - Line, value and header count limits via [`HeadLimits`]
//!
//! - [`HeaderEncoder`]: Encodes a response status line and headers to bytes

mod head_decoder;
mod header_encoder;

pub use head_decoder::HeadDecoder;
pub use head_decoder::HeadLimits;
pub use header_encoder::HeaderEncoder;
pub use header_encoder::status_text;
pub(crate) use header_encoder::FastWrite;
