//! JSON Lines (NDJSON) helpers for inbound message scripts.
//!
//! A script is one [`Inbound`] JSON object per line. The reader returns an
//! iterator that *owns* its file, yielding `Result<Inbound>` so callers can
//! surface per-line errors and feed the rest straight into
//! [`TraceLogger::drain`](crate::logger::TraceLogger).
//!
//! Blank lines are skipped; `.jsonl` and `.ndjson` are treated alike.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::dispatch::Inbound;

/// Owning JSONL iterator over [`Inbound`] messages.
#[derive(Debug)]
pub struct JsonlInboundIter {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
}

impl JsonlInboundIter {
    fn new(file: File) -> Self {
        Self {
            rdr: BufReader::new(file),
            buf: String::with_capacity(1 << 10),
            line_no: 0,
        }
    }
}

impl Iterator for JsonlInboundIter {
    type Item = Result<Inbound>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(
                        serde_json::from_str(line)
                            .with_context(|| format!("parse jsonl line {}", self.line_no)),
                    );
                }
                Err(e) => {
                    return Some(Err(e).with_context(|| format!("read line {}", self.line_no + 1)))
                }
            }
        }
    }
}

/// Stream-read a script; only one message is materialized at a time.
///
/// # Errors
/// Opening the file may fail. Individual items are `Err` for malformed lines.
pub fn stream_inbound_jsonl<P: AsRef<Path>>(path: P) -> Result<JsonlInboundIter> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(JsonlInboundIter::new(f))
}

/// Write messages as JSON Lines.
pub fn write_inbound_jsonl<P: AsRef<Path>>(path: P, msgs: &[Inbound]) -> Result<()> {
    write_jsonl(path, msgs)
}

/// Generic JSONL writer (one `serde_json` object per line).
pub fn write_jsonl<P: AsRef<Path>, T: Serialize>(path: P, items: &[T]) -> Result<()> {
    let f = File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    let mut w = BufWriter::new(f);
    for it in items {
        serde_json::to_writer(&mut w, it).context("serialize jsonl item")?;
        w.write_all(b"\n").context("write newline")?;
    }
    w.flush().context("flush writer")?;
    Ok(())
}
