//! Error types for the trace logger.
//!
//! The writer never panics on bad input or failing storage; every failure is
//! one of the variants below, returned synchronously to the caller. A capped
//! file is *not* an error (see [`crate::writer::Disposition::CapReached`]).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by configuration, encoding and file I/O.
#[derive(Debug, Error)]
pub enum TraceLogError {
    /// Configured file name does not fit the name buffer.
    #[error("log file name is {len} bytes (max {max})")]
    NameTooLong {
        /// Length of the rejected name in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },

    /// Configured file name is empty.
    #[error("log file name is empty")]
    MissingName,

    /// Reconfiguration attempted while a log file is open.
    #[error("log file {path} is open; close it before reconfiguring")]
    AlreadyOpen {
        /// Path of the currently open file.
        path: PathBuf,
    },

    /// Payload does not fit the scratch buffer after the record header.
    #[error("trace payload is {len} bytes (max {max})")]
    PayloadTooLarge {
        /// Offending payload length.
        len: usize,
        /// Largest payload the encoder accepts.
        max: usize,
    },

    /// Creating the log file failed; the writer stays closed.
    #[error("open trace log {path}")]
    Open {
        /// Path that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Appending to the log file failed; the file is unusable for this run.
    #[error("write trace log {path}")]
    Write {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl TraceLogError {
    /// Short, stable kind label for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NameTooLong { .. } => "name_too_long",
            Self::MissingName => "missing_name",
            Self::AlreadyOpen { .. } => "already_open",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Open { .. } => "open_failed",
            Self::Write { .. } => "write_failed",
        }
    }
}

/// Failures while splitting a byte stream back into records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Stream ended in the middle of a record.
    #[error("truncated record at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        /// Offset of the record start.
        offset: usize,
        /// Bytes required to finish the record.
        needed: usize,
        /// Bytes remaining from `offset`.
        available: usize,
    },

    /// Unknown trace type tag.
    #[error("unknown trace type tag {tag} at offset {offset}")]
    UnknownType {
        /// Offset of the record start.
        offset: usize,
        /// The tag byte.
        tag: u8,
    },

    /// Length prefix exceeds the largest payload any writer produces.
    #[error("payload length {len} exceeds max {max} at offset {offset}")]
    PayloadTooLarge {
        /// Offset of the record start.
        offset: usize,
        /// Decoded length prefix.
        len: usize,
        /// Maximum payload length.
        max: usize,
    },
}
