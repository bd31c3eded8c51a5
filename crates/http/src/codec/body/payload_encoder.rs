use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::identity_encoder::IdentityEncoder;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};

use tokio_util::codec::Encoder;

/// encode payload for response body
///
/// The framing is chosen once, when the response head is committed, and never
/// changes for the rest of the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// unframed payload, delimited by content-length or connection close
    Identity(IdentityEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// response to a HEAD request: head only, body bytes are dropped
    Discard,
}

impl PayloadEncoder {
    /// create an identity `PayloadEncoder` with an optional declared length
    pub fn identity(declared_length: Option<u64>) -> Self {
        Self { kind: Kind::Identity(IdentityEncoder::new(declared_length)) }
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    /// create a `PayloadEncoder` that writes nothing
    pub fn discard() -> Self {
        Self { kind: Kind::Discard }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_discard(&self) -> bool {
        matches!(self.kind, Kind::Discard)
    }

    /// Bytes still owed against a declared length, if this is an identity encoder.
    pub fn remaining(&self) -> Option<i64> {
        match &self.kind {
            Kind::Identity(encoder) => Some(encoder.remaining()),
            _ => None,
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Identity(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::Discard => Ok(()),
        }
    }
}
