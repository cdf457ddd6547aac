//! Canonical record types used across the tracelog workspace.
//!
//! These live in `tracelog-core` and are re-exported at the crate root so other
//! crates can import via `tracelog_core::TraceRecord`, `tracelog_core::TraceTime`, etc.
//!
//! The serde forms are for scripts and tooling only; the on-disk layout is the
//! fixed binary encoding in [`crate::codec`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trace-point identifier.
pub type TraceId = u32;

/// Time tag attached to every trace record.
///
/// Serialized as `base: u16`, `context: u8`, `seconds: u32`, `useconds: u32`
/// (11 bytes, big-endian).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TraceTime {
    /// Time base (clock source) identifier.
    pub base: u16,
    /// Time context (user-defined epoch/segment tag).
    pub context: u8,
    /// Whole seconds.
    pub seconds: u32,
    /// Sub-second fraction in microseconds.
    pub useconds: u32,
}

impl TraceTime {
    /// Serialized width of a time tag in bytes.
    pub const SERIALIZED_SIZE: usize = 2 + 1 + 4 + 4;

    /// Construct a time tag.
    #[inline]
    #[must_use]
    pub const fn new(base: u16, context: u8, seconds: u32, useconds: u32) -> Self {
        Self {
            base,
            context,
            seconds,
            useconds,
        }
    }
}

impl fmt::Display for TraceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06} (base={}, ctx={})",
            self.seconds, self.useconds, self.base, self.context
        )
    }
}

/// Kind of trace point.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TraceType {
    /// Entry into a traced scope.
    Enter = 0,
    /// Exit from a traced scope.
    Exit = 1,
    /// Standalone trace point.
    Point = 2,
    /// Message-queue activity.
    MessageQueue = 3,
    /// Port invocation.
    PortCall = 4,
    /// User-defined trace.
    User = 5,
}

impl TraceType {
    /// All variants in wire order.
    pub const ALL: [Self; 6] = [
        Self::Enter,
        Self::Exit,
        Self::Point,
        Self::MessageQueue,
        Self::PortCall,
        Self::User,
    ];

    /// Wire tag.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag; `None` for unknown tags.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Enter),
            1 => Some(Self::Exit),
            2 => Some(Self::Point),
            3 => Some(Self::MessageQueue),
            4 => Some(Self::PortCall),
            5 => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for TraceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Point => "point",
            Self::MessageQueue => "message_queue",
            Self::PortCall => "port_call",
            Self::User => "user",
        };
        f.write_str(s)
    }
}

/// One trace event: identifier, time tag, kind and serialized argument bytes.
///
/// Only its encoding is ever persisted; this owned form is used by scripts,
/// decoders and tests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceRecord {
    /// Trace-point identifier.
    pub id: TraceId,
    /// Time tag.
    pub time: TraceTime,
    /// Trace kind.
    pub kind: TraceType,
    /// Serialized arguments (opaque to the logger).
    #[serde(default)]
    pub payload: Vec<u8>,
}

impl TraceRecord {
    /// Construct a record.
    #[must_use]
    pub fn new(id: TraceId, time: TraceTime, kind: TraceType, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            time,
            kind,
            payload: payload.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_type_tags_roundtrip() {
        for t in TraceType::ALL {
            assert_eq!(TraceType::from_u8(t.as_u8()), Some(t));
        }
        assert_eq!(TraceType::from_u8(6), None);
        assert_eq!(TraceType::from_u8(0xFF), None);
    }

    #[test]
    fn record_serde_uses_snake_case_kind() {
        let r = TraceRecord::new(3, TraceTime::new(1, 0, 10, 20), TraceType::PortCall, vec![1, 2]);
        let s = serde_json::to_string(&r).unwrap();
        assert!(s.contains(r#""kind":"port_call""#));
        let back: TraceRecord = serde_json::from_str(&s).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn time_display_pads_fraction() {
        let t = TraceTime::new(2, 1, 5, 42);
        assert_eq!(t.to_string(), "5.000042 (base=2, ctx=1)");
    }
}
