//! tracelog-bench-harness
//!
//! Run small end-to-end benchmarks (generate -> replay through a capped logger
//! -> decode) and append CSV rows into `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p tracelog-bench-harness -- --profile benchmarks/profiles/small.toml
//!   cargo run -p tracelog-bench-harness -- --profile benchmarks/profiles/small.toml --disabled true

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use tracelog_core::{decode_all, TraceLogger};
use tracelog_sim::generator::{generate_script, GenParams};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Trace events per generated script
    events: u32,
    /// Largest payload per event
    max_payload: usize,
    /// Byte budget of the log file
    max_size: u32,
    /// Probability of a command before each event
    #[serde(default)]
    command_rate: f64,
    /// Repetitions of the whole pipeline
    repeats: u32,
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn dur_us(d: Duration) -> u128 {
    d.as_micros()
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "benchmarks/profiles/small.toml"));
    let disabled: bool = parse_flag("disabled", "false")
        .parse()
        .context("--disabled expects true|false")?;

    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {:?}", profile_path))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    println!(
        "Profile: events={}, max_payload={}, max_size={}, repeats={}, disabled={disabled}",
        profile.events, profile.max_payload, profile.max_size, profile.repeats
    );

    fs::create_dir_all("benchmarks/reports").ok();

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before unix epoch")?
        .as_secs();
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)?;
    writeln!(csv, "timestamp,events,max_payload,max_size,repeat,stage,us,extra")?;

    for rep in 0..profile.repeats {
        let log_path = PathBuf::from(format!("benchmarks/tmp-trace-{ts}-{rep}.bin"));

        // 1) generate script
        let t0 = Instant::now();
        let script = generate_script(&GenParams {
            events: profile.events,
            max_payload: profile.max_payload,
            command_rate: profile.command_rate,
            seed: u64::from(rep),
        });
        let t_gen = t0.elapsed();
        writeln!(
            csv,
            "{ts},{},{},{},{},gen,{},messages={}",
            profile.events,
            profile.max_payload,
            profile.max_size,
            rep,
            dur_us(t_gen),
            script.len()
        )?;

        // 2) replay through the logger
        let mut logger = TraceLogger::new();
        logger.set_log_file(&log_path, profile.max_size)?;
        logger.enable_trace(!disabled);
        let t0 = Instant::now();
        let summary = logger.drain(script.messages);
        logger.close_file()?;
        let t_replay = t0.elapsed();
        writeln!(
            csv,
            "{ts},{},{},{},{},replay,{},written={};bytes={};capped={}",
            profile.events,
            profile.max_payload,
            profile.max_size,
            rep,
            dur_us(t_replay),
            summary.written,
            summary.bytes_written,
            summary.cap_reached
        )?;

        // 3) decode and check the record count
        if log_path.exists() {
            let bytes = fs::read(&log_path)?;
            let t0 = Instant::now();
            let recs = decode_all(&bytes).context("decode trace log")?;
            let t_decode = t0.elapsed();
            anyhow::ensure!(
                recs.len() as u64 == summary.written,
                "decoded {} records, logger wrote {}",
                recs.len(),
                summary.written
            );
            writeln!(
                csv,
                "{ts},{},{},{},{},decode,{},records={}",
                profile.events,
                profile.max_payload,
                profile.max_size,
                rep,
                dur_us(t_decode),
                recs.len()
            )?;
        }

        // cleanup temp files to avoid disk bloat
        let _ = fs::remove_file(&log_path);
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}
