//! I/O helpers for the `Script` envelope (format-level).
//!
//! Supports JSON/CBOR envelopes plus bare JSON Lines (one `Inbound` per line,
//! no envelope), with extension-based auto-detection. These routines do not
//! run anything through a logger; they only move scripts across the wire.

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

use crate::script::Script;
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracelog_core::io_jsonl::{stream_inbound_jsonl, write_inbound_jsonl};

/* ---------------- JSON ---------------- */

/// Read a `Script` from **JSON**.
///
/// Errors include file open, decoding, or malformed structure.
pub fn read_script_json<P: AsRef<Path>>(path: P) -> Result<Script> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let rdr = BufReader::new(f);
    let v: Script = serde_json::from_reader(rdr).with_context(|| "deserialize JSON script")?;
    Ok(v)
}

/// Write a `Script` to **JSON** (pretty).
pub fn write_script_json<P: AsRef<Path>>(path: P, v: &Script) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, v).with_context(|| "serialize JSON script")?;
    w.flush().with_context(|| "flush JSON writer")?;
    Ok(())
}

/* ---------------- CBOR ---------------- */

/// Read a `Script` from **CBOR**.
pub fn read_script_cbor<P: AsRef<Path>>(path: P) -> Result<Script> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    let v: Script =
        ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR script")?;
    Ok(v)
}

/// Write a `Script` to **CBOR**.
pub fn write_script_cbor<P: AsRef<Path>>(path: P, v: &Script) -> Result<()> {
    let path_ref = path.as_ref();
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR script")?;
    w.flush().with_context(|| "flush CBOR writer")?;
    Ok(())
}

/* ---------------- JSONL ---------------- */

/// Read bare JSON Lines into a current-version `Script` (no metadata).
pub fn read_script_jsonl<P: AsRef<Path>>(path: P) -> Result<Script> {
    let messages = stream_inbound_jsonl(path)?.collect::<Result<Vec<_>>>()?;
    Ok(Script::new(messages))
}

/// Write the messages of a `Script` as JSON Lines (metadata is dropped).
pub fn write_script_jsonl<P: AsRef<Path>>(path: P, v: &Script) -> Result<()> {
    write_inbound_jsonl(path, &v.messages)
}

/* --------------- Auto-detect by extension --------------- */

/// Auto-detect **read** by extension (`.json` / `.cbor` / `.jsonl` / `.ndjson`,
/// case-insensitive).
pub fn read_script_auto<P: AsRef<Path>>(path: P) -> Result<Script> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_script_json(path),
        Some("cbor") => read_script_cbor(path),
        Some("jsonl" | "ndjson") => read_script_jsonl(path),
        Some(other) => Err(anyhow!(
            "unsupported script extension: {} (supported: .json, .cbor, .jsonl, .ndjson)",
            other
        )),
        None => Err(anyhow!(
            "path has no extension (expected .json, .cbor, .jsonl, or .ndjson)"
        )),
    }
}

/// Auto-detect **write** (defaults to JSON if unknown/missing).
pub fn write_script_auto<P: AsRef<Path>>(path: P, v: &Script) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_script_cbor(path, v),
        Some("jsonl" | "ndjson") => write_script_jsonl(path, v),
        _ => write_script_json(path, v),
    }
}

/* ---------------- Small helpers ---------------- */

#[inline]
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

#[inline]
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_script, GenParams};

    fn tmp_path(name: &str, ext: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("tracelog_sim_io_{name}_{nanos}.{ext}"));
        p
    }

    #[test]
    fn cbor_keeps_metadata() {
        let path = tmp_path("script", "CBOR");
        let s = generate_script(&GenParams::default());
        write_script_auto(&path, &s).unwrap();
        assert_eq!(read_script_auto(&path).unwrap(), s);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn jsonl_drops_metadata_only() {
        let path = tmp_path("script", "jsonl");
        let s = generate_script(&GenParams::default());
        write_script_auto(&path, &s).unwrap();
        let back = read_script_auto(&path).unwrap();
        assert_eq!(back.messages, s.messages);
        assert!(back.meta.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_extension_is_rejected_on_read() {
        let err = read_script_auto("script.yaml").unwrap_err();
        assert!(err.to_string().contains("unsupported script extension"));
    }
}
