use bytes::{Buf, Bytes};

/// One step of an outgoing body: a run of bytes, or the end of the body.
///
/// Body sinks feed these to the [`PayloadEncoder`](crate::codec::PayloadEncoder)
/// chosen when the response is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<D: Buf = Bytes> {
    Chunk(D),
    Eof,
}
