// crates/tracelog-sim/src/script.rs

//! Versioned envelope around an ordered inbound-message sequence.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use serde::{Deserialize, Serialize};
use tracelog_core::{Inbound, TraceRecord};

/// Current script format version.
pub const SCRIPT_VERSION: u16 = 1;

/// Script envelope.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Script {
    /// Format/version tag for forward-compat.
    pub version: u16,
    /// Messages in delivery order.
    pub messages: Vec<Inbound>,
    /// Optional metadata (seed, generator parameters, source host…).
    pub meta: Option<serde_json::Value>,
}

impl Script {
    /// Wrap messages in a current-version envelope.
    #[must_use]
    pub const fn new(messages: Vec<Inbound>) -> Self {
        Self {
            version: SCRIPT_VERSION,
            messages,
            meta: None,
        }
    }

    /// Number of messages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the script is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate the trace events only, skipping commands.
    pub fn traces(&self) -> impl Iterator<Item = &TraceRecord> {
        self.messages.iter().filter_map(|m| match m {
            Inbound::Trace(r) => Some(r),
            _ => None,
        })
    }
}
