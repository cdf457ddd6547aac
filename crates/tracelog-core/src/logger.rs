//! The trace logger component.
//!
//! [`TraceLogger`] glues the record encoder to the capped writer and exposes
//! the command surface a dispatcher drives:
//!
//! - `log_trace`: encode one event and hand it to the writer;
//! - `set_log_file` / `configure`: store the target (no filesystem access);
//! - `enable_trace`: flip the enable gate;
//! - `dump_trace_dp`: delegate export of the accumulated log to an optional
//!   [`TraceExporter`].
//!
//! Everything runs on the caller's thread through `&mut self`; the component
//! does no locking and must not be shared across threads without external
//! serialization.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::codec::RecordEncoder;
use crate::error::TraceLogError;
use crate::storage::{FsStorage, LogStorage};
use crate::types::{TraceId, TraceRecord, TraceTime, TraceType};
use crate::writer::{Disposition, FileMode, TraceFileWriter};

/// Completion status returned to the issuing command channel.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandResponse {
    /// Command completed.
    Ok,
    /// Command arguments were rejected.
    ValidationError,
    /// Command was accepted but failed while executing.
    ExecutionError,
}

/// Snapshot handed to a [`TraceExporter`] on a dump request.
#[derive(Clone, Copy, Debug)]
pub struct ExportRequest<'a> {
    /// Configured log file, if any.
    pub path: Option<&'a Path>,
    /// Bytes written to the current file so far.
    pub byte_count: u32,
    /// Whether the file is currently open.
    pub mode: FileMode,
}

/// External sink that turns accumulated trace data into a data product.
///
/// Implementors must not assume the file exists (a logger that never
/// received a record has nothing on disk) and must not write to it.
pub trait TraceExporter {
    /// Export the log described by `req`.
    ///
    /// # Errors
    /// Any failure is reported to the command issuer as
    /// [`CommandResponse::ExecutionError`].
    fn export(&mut self, req: &ExportRequest<'_>) -> Result<()>;
}

/// Encoder + bounded writer + command surface.
pub struct TraceLogger<S: LogStorage = FsStorage> {
    encoder: RecordEncoder,
    writer: TraceFileWriter<S>,
    exporter: Option<Box<dyn TraceExporter>>,
}

impl Default for TraceLogger<FsStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceLogger<FsStorage> {
    /// Logger over the local filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_storage(FsStorage)
    }
}

impl<S: LogStorage> TraceLogger<S> {
    /// Logger over custom storage.
    #[must_use]
    pub const fn with_storage(storage: S) -> Self {
        Self {
            encoder: RecordEncoder::new(),
            writer: TraceFileWriter::new(storage),
            exporter: None,
        }
    }

    /// Attach the sink used by [`Self::dump_trace_dp`].
    #[must_use]
    pub fn with_exporter(mut self, exporter: Box<dyn TraceExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Replace (or remove) the export sink.
    pub fn set_exporter(&mut self, exporter: Option<Box<dyn TraceExporter>>) {
        self.exporter = exporter;
    }

    /// Read-only view of the writer state.
    #[must_use]
    pub const fn writer(&self) -> &TraceFileWriter<S> {
        &self.writer
    }

    /// Mutable access to the writer.
    pub fn writer_mut(&mut self) -> &mut TraceFileWriter<S> {
        &mut self.writer
    }

    /* ---------------- Configuration ---------------- */

    /// Store the log file path and byte budget. See [`TraceFileWriter::set_log_file`].
    pub fn set_log_file(&mut self, name: impl AsRef<Path>, max_size: u32) -> Result<(), TraceLogError> {
        self.writer.set_log_file(name, max_size)
    }

    /// Store the log file path with the default budget.
    pub fn configure(&mut self, file: impl AsRef<Path>) -> Result<(), TraceLogError> {
        self.writer.configure(file)
    }

    /// Close the current file so the logger can be reconfigured.
    pub fn close_file(&mut self) -> Result<(), TraceLogError> {
        self.writer.close()
    }

    /* ---------------- Trace input ---------------- */

    /// Encode and persist one trace event.
    ///
    /// Callers on the steady-state path may ignore the result: drops are
    /// reported as a [`Disposition`], and errors surface only once per fault.
    pub fn log_trace(
        &mut self,
        id: TraceId,
        time: TraceTime,
        kind: TraceType,
        payload: &[u8],
    ) -> Result<Disposition, TraceLogError> {
        if !self.writer.enabled() {
            return Ok(Disposition::Disabled);
        }
        let bytes = match self.encoder.encode(id, &time, kind, payload) {
            Ok(b) => b,
            Err(e) => {
                warn!(kind = e.kind(), id, len = payload.len(), "trace record rejected by encoder");
                return Err(e);
            }
        };
        self.writer.write_record(bytes)
    }

    /// [`Self::log_trace`] for an owned record.
    pub fn log_record(&mut self, r: &TraceRecord) -> Result<Disposition, TraceLogError> {
        self.log_trace(r.id, r.time, r.kind, &r.payload)
    }

    /* ---------------- Commands ---------------- */

    /// Enable or disable trace logging. Idempotent.
    pub fn enable_trace(&mut self, enable: bool) -> CommandResponse {
        if self.writer.enabled() != enable {
            info!(enable, "trace logging toggled");
        }
        self.writer.set_enabled(enable);
        CommandResponse::Ok
    }

    /// Request export of the accumulated log to the external sink.
    ///
    /// Never changes the writer's mode or byte count.
    pub fn dump_trace_dp(&mut self) -> CommandResponse {
        let req = ExportRequest {
            path: self.writer.file_name(),
            byte_count: self.writer.byte_count(),
            mode: self.writer.mode(),
        };
        let Some(exporter) = self.exporter.as_mut() else {
            info!(byte_count = req.byte_count, "trace dump requested; no exporter attached");
            return CommandResponse::Ok;
        };
        match exporter.export(&req) {
            Ok(()) => {
                info!(byte_count = req.byte_count, "trace dump exported");
                CommandResponse::Ok
            }
            Err(e) => {
                warn!(kind = "export_failed", error = %format!("{e:#}"), "trace dump failed");
                CommandResponse::ExecutionError
            }
        }
    }
}

impl<S: LogStorage> fmt::Debug for TraceLogger<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceLogger")
            .field("writer", &self.writer)
            .field("exporter", &self.exporter.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recording(Rc<RefCell<Vec<(Option<String>, u32, FileMode)>>>);

    impl TraceExporter for Recording {
        fn export(&mut self, req: &ExportRequest<'_>) -> Result<()> {
            self.0.borrow_mut().push((
                req.path.map(|p| p.display().to_string()),
                req.byte_count,
                req.mode,
            ));
            Ok(())
        }
    }

    struct Failing;

    impl TraceExporter for Failing {
        fn export(&mut self, _req: &ExportRequest<'_>) -> Result<()> {
            Err(anyhow!("sink offline"))
        }
    }

    #[test]
    fn enable_is_idempotent_and_acknowledged() {
        let mut l = TraceLogger::new();
        assert_eq!(l.enable_trace(false), CommandResponse::Ok);
        assert_eq!(l.enable_trace(false), CommandResponse::Ok);
        assert!(!l.writer().enabled());
        assert_eq!(l.enable_trace(true), CommandResponse::Ok);
        assert!(l.writer().enabled());
        assert_eq!(l.writer().mode(), FileMode::Closed);
        assert_eq!(l.writer().byte_count(), 0);
    }

    #[test]
    fn dump_without_exporter_is_acknowledged() {
        let mut l = TraceLogger::new();
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);
    }

    #[test]
    fn dump_delegates_snapshot_to_exporter() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut l = TraceLogger::new().with_exporter(Box::new(Recording(Rc::clone(&seen))));
        l.configure("dump-target.bin").unwrap();
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);
        assert_eq!(
            *seen.borrow(),
            vec![(Some("dump-target.bin".to_string()), 0, FileMode::Closed)]
        );
    }

    #[test]
    fn dump_failure_maps_to_execution_error() {
        let mut l = TraceLogger::new().with_exporter(Box::new(Failing));
        assert_eq!(l.dump_trace_dp(), CommandResponse::ExecutionError);
    }

    #[test]
    fn oversized_payload_is_rejected_even_when_unconfigured() {
        let mut l = TraceLogger::new();
        let big = vec![0u8; crate::codec::MAX_PAYLOAD + 1];
        assert!(matches!(
            l.log_trace(1, TraceTime::default(), TraceType::User, &big),
            Err(TraceLogError::PayloadTooLarge { .. })
        ));
        assert_eq!(
            l.log_trace(1, TraceTime::default(), TraceType::User, &[]).unwrap(),
            Disposition::Unconfigured
        );
    }
}
