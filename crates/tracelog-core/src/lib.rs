//! tracelog-core: bounded, append-only trace-record file writer.
//!
//! This crate defines the pieces a host wires together to persist trace events:
//! - canonical record types (`TraceRecord`, `TraceTime`, `TraceType`),
//! - the fixed-layout record **codec** with a reusable scratch buffer,
//! - the capped **writer** state machine (lazy open, byte accounting, latching
//!   failures), behind a small `LogStorage` seam,
//! - the `TraceLogger` component with its command surface and the ordered
//!   inbound-message dispatcher, and
//! - TOML configuration plus JSONL helpers for inbound scripts.
//!
//! ```no_run
//! use tracelog_core::{TraceLogger, TraceTime, TraceType};
//!
//! let mut logger = TraceLogger::new();
//! logger.set_log_file("trace.bin", 4096)?;
//! // The first accepted record opens (and truncates) `trace.bin`.
//! let _ = logger.log_trace(7, TraceTime::new(0, 0, 12, 500), TraceType::Enter, b"args");
//! # Ok::<(), tracelog_core::TraceLogError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Fixed-layout record encoder and stream decoder.
pub mod codec;
/// TOML-backed logger configuration.
pub mod config;
/// Inbound message type and the in-order dispatcher.
pub mod dispatch;
/// Error types for configuration, encoding, I/O and decoding.
pub mod error;
/// Streaming JSONL helpers for inbound message scripts.
pub mod io_jsonl;
/// The `TraceLogger` component: encoder + writer + command surface.
pub mod logger;
/// Storage seam used by the writer to create log files.
pub mod storage;
/// Canonical record types shared across the workspace.
pub mod types;
/// Capped, lazily-opened file writer state machine.
pub mod writer;

// ---- Re-exports for workspace compatibility ----
pub use codec::*;
pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use logger::*;
pub use storage::*;
pub use types::*;
pub use writer::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use tracelog_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        config::TraceLogConfig,
        dispatch::{Inbound, CommandStatus},
        logger::{CommandResponse, TraceLogger},
        types::*,
        writer::Disposition,
    };
}
