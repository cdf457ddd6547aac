//! Capped, lazily-opened trace log writer.
//!
//! State machine per incoming encoded record of length `n`:
//!
//! 1. disabled → drop ([`Disposition::Disabled`]);
//! 2. no file configured → drop ([`Disposition::Unconfigured`]);
//! 3. a previous open/write failure is latched → drop ([`Disposition::Unavailable`]);
//! 4. closed → create/truncate the file; on failure return the error once and latch;
//! 5. cap already hit, or `byte_count + n > max_size` → drop and latch the cap
//!    ([`Disposition::CapReached`]); no error, the file stays open;
//! 6. otherwise `write_all`; success bumps `byte_count`, failure returns the
//!    error once and latches.
//!
//! `byte_count` is tracked here, never read back from the filesystem, and
//! only grows by whole records.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{DEFAULT_MAX_SIZE, FILE_NAME_MAX};
use crate::error::TraceLogError;
use crate::storage::{FsStorage, LogStorage};

/// Whether the log file is currently open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    /// No file handle held (initial state).
    Closed,
    /// File created and accepting records.
    Open,
}

/// Latched failure that makes the current file unusable until reconfiguration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Creating the file failed.
    OpenFailed,
    /// A write failed part-way; the byte stream can no longer be trusted.
    WriteFailed,
}

/// What happened to one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Record appended in full.
    Written {
        /// Encoded bytes appended.
        bytes: usize,
    },
    /// Tracing is disabled.
    Disabled,
    /// No log file has been configured.
    Unconfigured,
    /// The file failed earlier and is no longer used.
    Unavailable,
    /// The byte budget is exhausted.
    CapReached,
}

impl Disposition {
    /// `true` if the record reached the file.
    #[inline]
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Bounded append-only writer over a [`LogStorage`].
pub struct TraceFileWriter<S: LogStorage = FsStorage> {
    storage: S,
    file: Option<S::File>,
    file_name: Option<PathBuf>,
    max_size: u32,
    byte_count: u32,
    enabled: bool,
    full: bool,
    fault: Option<Fault>,
}

impl<S: LogStorage> fmt::Debug for TraceFileWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceFileWriter")
            .field("mode", &self.mode())
            .field("file_name", &self.file_name)
            .field("max_size", &self.max_size)
            .field("byte_count", &self.byte_count)
            .field("enabled", &self.enabled)
            .field("full", &self.full)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl Default for TraceFileWriter<FsStorage> {
    fn default() -> Self {
        Self::new(FsStorage)
    }
}

impl<S: LogStorage> TraceFileWriter<S> {
    /// New writer: closed, unconfigured, enabled, default budget.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            file: None,
            file_name: None,
            max_size: DEFAULT_MAX_SIZE,
            byte_count: 0,
            enabled: true,
            full: false,
            fault: None,
        }
    }

    /* ---------------- Configuration ---------------- */

    /// Store the target path and byte budget. Does not touch the filesystem.
    ///
    /// Rejected while a file is open. An invalid name leaves the writer
    /// unconfigured, so records are dropped until a valid call succeeds. A
    /// successful call clears any latched cap or fault.
    pub fn set_log_file(&mut self, name: impl AsRef<Path>, max_size: u32) -> Result<(), TraceLogError> {
        if let (Some(_), Some(path)) = (&self.file, &self.file_name) {
            return Err(TraceLogError::AlreadyOpen { path: path.clone() });
        }

        let name = name.as_ref();
        let len = name.as_os_str().len();
        let checked = if len == 0 {
            Err(TraceLogError::MissingName)
        } else if len > FILE_NAME_MAX {
            Err(TraceLogError::NameTooLong {
                len,
                max: FILE_NAME_MAX,
            })
        } else {
            Ok(())
        };
        if let Err(e) = checked {
            warn!(kind = e.kind(), len, "rejected trace log configuration");
            self.file_name = None;
            return Err(e);
        }

        debug!(path = %name.display(), max_size, "trace log configured");
        self.file_name = Some(name.to_path_buf());
        self.max_size = max_size;
        self.byte_count = 0;
        self.full = false;
        self.fault = None;
        Ok(())
    }

    /// [`Self::set_log_file`] with [`DEFAULT_MAX_SIZE`].
    pub fn configure(&mut self, name: impl AsRef<Path>) -> Result<(), TraceLogError> {
        self.set_log_file(name, DEFAULT_MAX_SIZE)
    }

    /// Set the enable gate. Never affects mode or byte count.
    #[inline]
    pub fn set_enabled(&mut self, enable: bool) {
        self.enabled = enable;
    }

    /* ---------------- Accessors ---------------- */

    /// Current enable gate.
    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Open/closed state.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> FileMode {
        if self.file.is_some() {
            FileMode::Open
        } else {
            FileMode::Closed
        }
    }

    /// Bytes appended to the current file.
    #[inline]
    #[must_use]
    pub const fn byte_count(&self) -> u32 {
        self.byte_count
    }

    /// Configured byte budget.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Configured path, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// Latched failure, if any.
    #[inline]
    #[must_use]
    pub const fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// `true` once a record has been refused for exceeding the budget.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.full
    }

    /// Borrow the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /* ---------------- Writing ---------------- */

    /// Run one encoded record through the state machine.
    ///
    /// Errors are returned only on the transition into a fault; every later
    /// record reports [`Disposition::Unavailable`].
    pub fn write_record(&mut self, bytes: &[u8]) -> Result<Disposition, TraceLogError> {
        if !self.enabled {
            return Ok(Disposition::Disabled);
        }
        let Some(path) = self.file_name.as_deref() else {
            return Ok(Disposition::Unconfigured);
        };
        if self.fault.is_some() {
            return Ok(Disposition::Unavailable);
        }

        if self.file.is_none() {
            match self.storage.create(path) {
                Ok(f) => {
                    info!(path = %path.display(), max_size = self.max_size, "opened trace log");
                    self.file = Some(f);
                    self.byte_count = 0;
                    self.full = false;
                }
                Err(source) => {
                    warn!(kind = "open_failed", path = %path.display(), error = %source, "trace log unavailable");
                    self.fault = Some(Fault::OpenFailed);
                    return Err(TraceLogError::Open {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        if self.full || !self.fits(bytes.len()) {
            if !self.full {
                debug!(
                    byte_count = self.byte_count,
                    max_size = self.max_size,
                    rejected = bytes.len(),
                    "trace log cap reached"
                );
                self.full = true;
            }
            return Ok(Disposition::CapReached);
        }

        let Some(file) = self.file.as_mut() else {
            return Ok(Disposition::Unavailable);
        };
        match file.write_all(bytes) {
            Ok(()) => {
                // `fits` guarantees this stays within `max_size: u32`.
                self.byte_count += u32::try_from(bytes.len()).unwrap_or(u32::MAX);
                Ok(Disposition::Written { bytes: bytes.len() })
            }
            Err(source) => {
                warn!(kind = "write_failed", path = %path.display(), byte_count = self.byte_count, error = %source, "trace log write failed");
                self.fault = Some(Fault::WriteFailed);
                Err(TraceLogError::Write {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Flush and release the file handle (explicit shutdown/reset).
    ///
    /// The file name is dropped along with the handle: records report
    /// [`Disposition::Unconfigured`] until `set_log_file`/`configure`
    /// succeeds, so a capped file is never silently truncated by a lazy
    /// reopen. Latched faults are *not* cleared here.
    pub fn close(&mut self) -> Result<(), TraceLogError> {
        let Some(mut f) = self.file.take() else {
            return Ok(());
        };
        let res = f.flush();
        let path = self.file_name.take().unwrap_or_default();
        info!(path = %path.display(), byte_count = self.byte_count, "closed trace log");
        res.map_err(|source| TraceLogError::Write { path, source })
    }

    #[inline]
    fn fits(&self, n: usize) -> bool {
        u64::from(self.byte_count) + n as u64 <= u64::from(self.max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// In-memory storage; every `create` truncates the shared buffer.
    #[derive(Default, Clone)]
    struct MemStorage {
        data: Rc<RefCell<Vec<u8>>>,
        opens: Rc<RefCell<usize>>,
        fail_open: bool,
        fail_after: Option<usize>,
    }

    struct MemFile {
        data: Rc<RefCell<Vec<u8>>>,
        fail_after: Option<usize>,
    }

    impl Write for MemFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut d = self.data.borrow_mut();
            if let Some(limit) = self.fail_after {
                let room = limit.saturating_sub(d.len());
                if room == 0 {
                    return Err(io::Error::new(io::ErrorKind::Other, "device full"));
                }
                let n = room.min(buf.len());
                d.extend_from_slice(&buf[..n]);
                return Ok(n);
            }
            d.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogStorage for MemStorage {
        type File = MemFile;

        fn create(&mut self, _path: &Path) -> io::Result<MemFile> {
            *self.opens.borrow_mut() += 1;
            if self.fail_open {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
            }
            self.data.borrow_mut().clear();
            Ok(MemFile {
                data: Rc::clone(&self.data),
                fail_after: self.fail_after,
            })
        }
    }

    fn writer(storage: MemStorage, max: u32) -> TraceFileWriter<MemStorage> {
        let mut w = TraceFileWriter::new(storage);
        w.set_log_file("trace.bin", max).unwrap();
        w
    }

    #[test]
    fn lazy_open_on_first_record() {
        let s = MemStorage::default();
        let mut w = writer(s.clone(), 100);
        assert_eq!(w.mode(), FileMode::Closed);
        assert_eq!(*s.opens.borrow(), 0);

        assert_eq!(w.write_record(&[1; 10]).unwrap(), Disposition::Written { bytes: 10 });
        assert_eq!(w.mode(), FileMode::Open);
        assert_eq!(*s.opens.borrow(), 1);
        assert_eq!(w.byte_count(), 10);
    }

    #[test]
    fn cap_is_exact_and_permanent() {
        let s = MemStorage::default();
        let mut w = writer(s.clone(), 100);
        assert!(w.write_record(&[1; 40]).unwrap().is_written());
        assert!(w.write_record(&[2; 40]).unwrap().is_written());
        assert_eq!(w.write_record(&[3; 40]).unwrap(), Disposition::CapReached);
        // A smaller record that would fit is still refused once capped.
        assert_eq!(w.write_record(&[4; 5]).unwrap(), Disposition::CapReached);
        assert_eq!(w.byte_count(), 80);
        assert_eq!(s.data.borrow().len(), 80);
        assert_eq!(w.mode(), FileMode::Open);
    }

    #[test]
    fn record_exactly_filling_budget_is_written() {
        let mut w = writer(MemStorage::default(), 50);
        assert!(w.write_record(&[0; 50]).unwrap().is_written());
        assert_eq!(w.byte_count(), 50);
        assert_eq!(w.write_record(&[0; 1]).unwrap(), Disposition::CapReached);
    }

    #[test]
    fn disabled_never_opens() {
        let s = MemStorage::default();
        let mut w = writer(s.clone(), 100);
        w.set_enabled(false);
        for _ in 0..5 {
            assert_eq!(w.write_record(&[1; 8]).unwrap(), Disposition::Disabled);
        }
        assert_eq!(w.mode(), FileMode::Closed);
        assert_eq!(*s.opens.borrow(), 0);
        assert_eq!(w.byte_count(), 0);
    }

    #[test]
    fn open_failure_reported_once() {
        let s = MemStorage {
            fail_open: true,
            ..MemStorage::default()
        };
        let mut w = writer(s.clone(), 100);
        assert!(matches!(w.write_record(&[1; 8]), Err(TraceLogError::Open { .. })));
        for _ in 0..10 {
            assert_eq!(w.write_record(&[1; 8]).unwrap(), Disposition::Unavailable);
        }
        assert_eq!(*s.opens.borrow(), 1);
        assert_eq!(w.mode(), FileMode::Closed);
        assert_eq!(w.fault(), Some(Fault::OpenFailed));
    }

    #[test]
    fn partial_write_latches_and_freezes_count() {
        let s = MemStorage {
            fail_after: Some(25),
            ..MemStorage::default()
        };
        let mut w = writer(s.clone(), 1000);
        assert!(w.write_record(&[1; 20]).unwrap().is_written());
        assert!(matches!(w.write_record(&[2; 20]), Err(TraceLogError::Write { .. })));
        assert_eq!(w.byte_count(), 20);
        assert_eq!(w.write_record(&[3; 1]).unwrap(), Disposition::Unavailable);
        assert_eq!(w.fault(), Some(Fault::WriteFailed));
        assert_eq!(*s.opens.borrow(), 1);
    }

    #[test]
    fn reconfigure_rejected_while_open() {
        let mut w = writer(MemStorage::default(), 100);
        w.write_record(&[1; 4]).unwrap();
        assert!(matches!(
            w.set_log_file("other.bin", 10),
            Err(TraceLogError::AlreadyOpen { .. })
        ));
        assert_eq!(w.file_name(), Some(Path::new("trace.bin")));
    }

    #[test]
    fn close_then_reconfigure_starts_fresh_file() {
        let s = MemStorage::default();
        let mut w = writer(s.clone(), 10);
        w.write_record(&[1; 10]).unwrap();
        assert_eq!(w.write_record(&[1; 1]).unwrap(), Disposition::CapReached);

        w.close().unwrap();
        assert_eq!(w.mode(), FileMode::Closed);
        w.set_log_file("trace.bin", 10).unwrap();
        assert!(w.write_record(&[2; 3]).unwrap().is_written());
        assert_eq!(w.byte_count(), 3);
        assert_eq!(*s.data.borrow(), vec![2; 3]);
    }

    #[test]
    fn close_without_reconfigure_keeps_capped_file() {
        let s = MemStorage::default();
        let mut w = writer(s.clone(), 10);
        w.write_record(&[1; 10]).unwrap();
        assert_eq!(w.write_record(&[1; 1]).unwrap(), Disposition::CapReached);

        w.close().unwrap();
        assert_eq!(w.file_name(), None);
        assert_eq!(w.write_record(&[2; 3]).unwrap(), Disposition::Unconfigured);
        assert_eq!(*s.data.borrow(), vec![1; 10]);
        assert_eq!(*s.opens.borrow(), 1);
        assert_eq!(w.mode(), FileMode::Closed);
    }

    #[test]
    fn invalid_names_leave_writer_unconfigured() {
        let mut w = writer(MemStorage::default(), 100);
        let long = "x".repeat(FILE_NAME_MAX + 1);
        assert!(matches!(
            w.set_log_file(&long, 100),
            Err(TraceLogError::NameTooLong { len, .. }) if len == FILE_NAME_MAX + 1
        ));
        assert_eq!(w.write_record(&[1]).unwrap(), Disposition::Unconfigured);
        assert!(matches!(w.configure(""), Err(TraceLogError::MissingName)));

        let exact = "y".repeat(FILE_NAME_MAX);
        w.configure(&exact).unwrap();
        assert_eq!(w.max_size(), DEFAULT_MAX_SIZE);
    }
}
