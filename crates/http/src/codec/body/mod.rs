//! HTTP body handling module for encoding response payloads
//!
//! # Components
//!
//! - [`ChunkedEncoder`]: Implements chunked transfer encoding
//! - [`IdentityEncoder`]: Forwards raw bytes, tracking a declared length
//! - [`PayloadEncoder`]: Main encoder that manages different encoding strategies
//!
//! Request bodies are not decoded here: the connection engine reads them
//! straight from its buffer, bounded by the declared `Content-Length`.

mod chunked_encoder;
mod identity_encoder;
mod payload_encoder;

pub use chunked_encoder::ChunkedEncoder;
pub use identity_encoder::IdentityEncoder;
pub use payload_encoder::PayloadEncoder;
