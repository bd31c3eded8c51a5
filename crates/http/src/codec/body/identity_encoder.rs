use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::trace;

/// Identity encoder: body bytes are forwarded unframed.
///
/// `remaining` counts down from the declared `Content-Length`. The count is
/// advisory only; writes past it are forwarded and it may go negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEncoder {
    remaining: i64,
}

impl IdentityEncoder {
    pub fn new(declared_length: Option<u64>) -> Self {
        let remaining = declared_length.map_or(0, |length| i64::try_from(length).unwrap_or(i64::MAX));
        Self { remaining }
    }

    /// Bytes still owed against the declared length.
    pub fn remaining(&self) -> i64 {
        self.remaining
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for IdentityEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining();
                dst.reserve(size);
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                self.remaining = self.remaining.saturating_sub(size as i64);
                Ok(())
            }
            PayloadItem::Eof => {
                trace!(remaining = self.remaining, "identity payload finished");
                Ok(())
            }
        }
    }
}
