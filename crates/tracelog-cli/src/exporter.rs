//! Data-product exporter used by `run --dp-dir`.
//!
//! Every dump command copies the current log file into the target directory
//! as `trace-dp-NNNN.bin`. Nothing is written until the logger has opened
//! its file; a same-named file left by an earlier run is never copied.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracelog_core::{ExportRequest, FileMode, TraceExporter};
use tracing::debug;

/// Copies the log file into a directory, one numbered snapshot per dump.
#[derive(Debug)]
pub struct SnapshotExporter {
    dir: PathBuf,
    next: u32,
}

impl SnapshotExporter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, next: 0 }
    }
}

impl TraceExporter for SnapshotExporter {
    fn export(&mut self, req: &ExportRequest<'_>) -> Result<()> {
        let Some(src) = req.path.filter(|_| req.mode == FileMode::Open) else {
            debug!(mode = ?req.mode, "trace log not open; nothing to export");
            return Ok(());
        };
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating dp directory {}", self.dir.display()))?;
        let dst = self.dir.join(format!("trace-dp-{:04}.bin", self.next));
        std::fs::copy(src, &dst)
            .with_context(|| format!("copy {} → {}", src.display(), dst.display()))?;
        self.next += 1;
        debug!(dst=%dst.display(), byte_count = req.byte_count, "exported trace snapshot");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tracelog_core::{CommandResponse, TraceLogger, TraceTime, TraceType};

    fn scratch(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tracelog_cli_{name}_{nanos}"))
    }

    #[test]
    fn snapshots_are_numbered_and_match_log() {
        let root = scratch("dp");
        std::fs::create_dir_all(&root).unwrap();
        let dp = root.join("dp");
        let log = root.join("trace.bin");

        let mut l = TraceLogger::new().with_exporter(Box::new(SnapshotExporter::new(dp.clone())));
        l.set_log_file(&log, 1024).unwrap();
        // Not opened yet: acknowledged, no snapshot.
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);
        assert!(!dp.exists());

        l.log_trace(1, TraceTime::default(), TraceType::Point, b"abc").unwrap();
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);
        l.log_trace(2, TraceTime::default(), TraceType::Point, b"de").unwrap();
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);

        let first = std::fs::read(dp.join("trace-dp-0000.bin")).unwrap();
        let second = std::fs::read(dp.join("trace-dp-0001.bin")).unwrap();
        assert_eq!(first.len() as u32 + 20, l.writer().byte_count());
        assert_eq!(second, std::fs::read(&log).unwrap());
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn leftover_log_from_earlier_run_is_not_exported() {
        let root = scratch("stale");
        std::fs::create_dir_all(&root).unwrap();
        let dp = root.join("dp");
        let log = root.join("trace.bin");
        std::fs::write(&log, b"previous run").unwrap();

        let mut l = TraceLogger::new().with_exporter(Box::new(SnapshotExporter::new(dp.clone())));
        l.set_log_file(&log, 1024).unwrap();
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);
        assert!(!dp.exists());
        assert_eq!(l.writer().byte_count(), 0);

        l.log_trace(7, TraceTime::default(), TraceType::Enter, b"x").unwrap();
        assert_eq!(l.dump_trace_dp(), CommandResponse::Ok);
        let snap = std::fs::read(dp.join("trace-dp-0000.bin")).unwrap();
        assert_eq!(snap.len() as u32, l.writer().byte_count());
        assert!(!snap.starts_with(b"previous run"));
        let _ = std::fs::remove_dir_all(root);
    }
}
