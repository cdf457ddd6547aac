//! Fixed-layout binary encoding of trace records.
//!
//! Each record is laid out as (all integers big-endian):
//!
//! ```text
//! [id: u32][base: u16][context: u8][seconds: u32][useconds: u32][type: u8][len: u16][payload: len bytes]
//! ```
//!
//! A log file is the plain concatenation of such records: no header, index or
//! footer. The length prefix is the only framing, so readers parse
//! sequentially from offset 0 ([`RecordIter`]).
//!
//! Encoding goes through [`RecordEncoder`], which owns a single scratch buffer
//! sized for the worst case and reuses it for every call.

use crate::error::{DecodeError, TraceLogError};
use crate::types::{TraceId, TraceRecord, TraceTime, TraceType};

/// Largest serialized argument payload accepted per record.
pub const MAX_PAYLOAD: usize = 256;

/// Encoded width of a trace id.
pub const ID_SIZE: usize = 4;
/// Encoded width of a trace type tag.
pub const TYPE_SIZE: usize = 1;
/// Encoded width of the payload length prefix.
pub const LEN_PREFIX_SIZE: usize = 2;

/// Fixed metadata bytes preceding every payload.
pub const RECORD_HEADER_SIZE: usize =
    ID_SIZE + TraceTime::SERIALIZED_SIZE + TYPE_SIZE + LEN_PREFIX_SIZE;

/// Largest encoded record (metadata + `MAX_PAYLOAD`).
pub const MAX_SERIALIZED_SIZE: usize = RECORD_HEADER_SIZE + MAX_PAYLOAD;

// The length prefix must be able to carry every legal payload.
const _: () = assert!(MAX_PAYLOAD <= u16::MAX as usize);

/// Encoded size of a record carrying `payload_len` bytes.
#[inline]
#[must_use]
pub const fn encoded_len(payload_len: usize) -> usize {
    RECORD_HEADER_SIZE + payload_len
}

/// Record encoder with a reusable worst-case scratch buffer.
///
/// The slice returned by [`RecordEncoder::encode`] borrows the scratch buffer,
/// so it cannot outlive the next call.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    buf: [u8; MAX_SERIALIZED_SIZE],
}

impl Default for RecordEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordEncoder {
    /// Create an encoder with a zeroed scratch buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0u8; MAX_SERIALIZED_SIZE],
        }
    }

    /// Capacity of the scratch buffer.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        MAX_SERIALIZED_SIZE
    }

    /// Encode one record into the scratch buffer and return the encoded span.
    ///
    /// Fails with [`TraceLogError::PayloadTooLarge`] (buffer untouched) if the
    /// payload does not fit after the metadata.
    pub fn encode(
        &mut self,
        id: TraceId,
        time: &TraceTime,
        kind: TraceType,
        payload: &[u8],
    ) -> Result<&[u8], TraceLogError> {
        let len = u16::try_from(payload.len())
            .ok()
            .filter(|&n| usize::from(n) <= MAX_PAYLOAD)
            .ok_or(TraceLogError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD,
            })?;

        let mut put = Put::new(&mut self.buf);
        put.bytes(&id.to_be_bytes());
        put.bytes(&time.base.to_be_bytes());
        put.bytes(&[time.context]);
        put.bytes(&time.seconds.to_be_bytes());
        put.bytes(&time.useconds.to_be_bytes());
        put.bytes(&[kind.as_u8()]);
        put.bytes(&len.to_be_bytes());
        put.bytes(payload);
        let n = put.at;

        debug_assert_eq!(n, encoded_len(payload.len()));
        Ok(&self.buf[..n])
    }

    /// Convenience wrapper over [`RecordEncoder::encode`] for an owned record.
    pub fn encode_record(&mut self, r: &TraceRecord) -> Result<&[u8], TraceLogError> {
        self.encode(r.id, &r.time, r.kind, &r.payload)
    }
}

/// Bounded cursor over the scratch buffer. Callers check capacity up front.
struct Put<'a> {
    buf: &'a mut [u8],
    at: usize,
}

impl<'a> Put<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, at: 0 }
    }

    #[inline]
    fn bytes(&mut self, src: &[u8]) {
        let end = self.at + src.len();
        self.buf[self.at..end].copy_from_slice(src);
        self.at = end;
    }
}

/* ---------------- Decoding ---------------- */

/// Decode the record starting at `bytes[0]`.
///
/// Returns the record and the number of bytes it occupied.
pub fn decode_record(bytes: &[u8]) -> Result<(TraceRecord, usize), DecodeError> {
    decode_at(bytes, 0)
}

/// Decode an entire stream; fails on the first malformed or truncated record.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<TraceRecord>, DecodeError> {
    RecordIter::new(bytes).collect()
}

fn decode_at(stream: &[u8], offset: usize) -> Result<(TraceRecord, usize), DecodeError> {
    let rest = &stream[offset..];
    if rest.len() < RECORD_HEADER_SIZE {
        return Err(DecodeError::Truncated {
            offset,
            needed: RECORD_HEADER_SIZE,
            available: rest.len(),
        });
    }

    let mut get = Get { buf: rest, at: 0 };
    let id = u32::from_be_bytes(get.array());
    let base = u16::from_be_bytes(get.array());
    let [context] = get.array::<1>();
    let seconds = u32::from_be_bytes(get.array());
    let useconds = u32::from_be_bytes(get.array());
    let [tag] = get.array::<1>();
    let len = usize::from(u16::from_be_bytes(get.array()));

    let kind = TraceType::from_u8(tag).ok_or(DecodeError::UnknownType { offset, tag })?;
    if len > MAX_PAYLOAD {
        return Err(DecodeError::PayloadTooLarge {
            offset,
            len,
            max: MAX_PAYLOAD,
        });
    }
    let total = encoded_len(len);
    if rest.len() < total {
        return Err(DecodeError::Truncated {
            offset,
            needed: total,
            available: rest.len(),
        });
    }

    let record = TraceRecord {
        id,
        time: TraceTime::new(base, context, seconds, useconds),
        kind,
        payload: rest[RECORD_HEADER_SIZE..total].to_vec(),
    };
    Ok((record, total))
}

/// Header reader; only used after the header length has been checked.
struct Get<'a> {
    buf: &'a [u8],
    at: usize,
}

impl Get<'_> {
    #[inline]
    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.at..self.at + N]);
        self.at += N;
        out
    }
}

/// Sequential reader over a concatenated record stream.
///
/// Yields `Err` once for the first malformed record and then stops.
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    bytes: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> RecordIter<'a> {
    /// Start reading at offset 0.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            done: false,
        }
    }

    /// Offset of the next record to be decoded.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<TraceRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.bytes.len() {
            return None;
        }
        match decode_at(self.bytes, self.offset) {
            Ok((rec, used)) => {
                self.offset += used;
                Some(Ok(rec))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
