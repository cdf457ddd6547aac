// crates/tracelog-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

mod exporter;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracelog_core::{RecordIter, TraceLogConfig, TraceLogger};
use tracelog_sim::{
    generator::{generate_script, GenParams},
    io::{read_script_auto, write_script_auto},
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::exporter::SnapshotExporter;

#[derive(Parser, Debug)]
#[command(
    name = "tracelog-cli",
    about = "tracelog reference CLI",
    long_about = "tracelog reference CLI.\n\nGenerate synthetic trace traffic, replay it through a bounded trace logger, and decode the resulting log files.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a synthetic inbound-message script.
    /// If --out ends with `.jsonl`, writes one message per line.
    Simulate {
        /// Number of trace events (>0)
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
        events: u32,

        /// Largest payload per event (clamped to the encoder limit)
        #[arg(long, default_value_t = 32)]
        max_payload: usize,

        /// Probability of a command before each event, in [0, 1]
        #[arg(long, default_value_t = 0.05)]
        command_rate: f64,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output path for the script (JSON/CBOR/JSONL)
        #[arg(long, default_value = "script.jsonl")]
        out: PathBuf,
    },

    /// Replay a script through a trace logger, in order, on this thread.
    Run {
        /// Input script (JSON/CBOR/JSONL)
        #[arg(long)]
        script: PathBuf,

        /// Logger configuration (TOML); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log file to write
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Byte budget for the log file
        #[arg(long)]
        max_size: Option<u32>,

        /// Start with tracing disabled
        #[arg(long, default_value_t = false)]
        disabled: bool,

        /// Directory receiving a snapshot of the log on every dump command
        #[arg(long)]
        dp_dir: Option<PathBuf>,

        /// Write the run summary (JSON) here
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Decode a binary trace log into JSON Lines.
    Decode {
        /// Input log file
        #[arg(long)]
        log: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Simulate {
            events,
            max_payload,
            command_rate,
            seed,
            out,
        } => simulate(
            &GenParams {
                events,
                max_payload,
                command_rate,
                seed,
            },
            &out,
        ),

        Cmd::Run {
            script,
            config,
            log_file,
            max_size,
            disabled,
            dp_dir,
            summary,
        } => run(RunArgs {
            script,
            config,
            log_file,
            max_size,
            disabled,
            dp_dir,
            summary,
        }),

        Cmd::Decode { log, out } => decode(&log, out.as_deref()),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

fn simulate(params: &GenParams, out: &Path) -> Result<()> {
    if !(0.0..=1.0).contains(&params.command_rate) {
        bail!(
            "command rate ({}) must lie in [0, 1]",
            params.command_rate
        );
    }

    info!(events = params.events, seed = params.seed, "generating synthetic script");
    let script = generate_script(params);

    ensure_parent_dir(out)?;
    write_script_auto(out, &script)
        .with_context(|| format!("writing script to {}", out.display()))?;

    println!(
        "Simulated script: {} events, {} messages → {}",
        params.events,
        script.len(),
        out.display()
    );
    Ok(())
}

struct RunArgs {
    script: PathBuf,
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
    max_size: Option<u32>,
    disabled: bool,
    dp_dir: Option<PathBuf>,
    summary: Option<PathBuf>,
}

fn run(args: RunArgs) -> Result<()> {
    let mut cfg = match &args.config {
        Some(p) => TraceLogConfig::load(p)?,
        None => TraceLogConfig::default(),
    };
    if let Some(f) = args.log_file {
        cfg.file_name = Some(f);
    }
    if let Some(m) = args.max_size {
        cfg.max_size = m;
    }
    if args.disabled {
        cfg.enabled = false;
    }
    let Some(log_path) = cfg.file_name.clone() else {
        bail!("no log file configured (use --log-file or file_name in --config)");
    };

    let mut logger = TraceLogger::new();
    if let Some(dir) = &args.dp_dir {
        logger.set_exporter(Some(Box::new(SnapshotExporter::new(dir.clone()))));
    }
    cfg.apply(&mut logger)
        .with_context(|| format!("configuring trace log {}", log_path.display()))?;

    let script = read_script_auto(&args.script)
        .with_context(|| format!("reading script {}", args.script.display()))?;
    info!(script=%args.script.display(), log=%log_path.display(), max_size = cfg.max_size, messages = script.len(), "replaying script");

    let summary = logger.drain(script.messages);
    logger.close_file().context("closing trace log")?;

    if let Some(out) = &args.summary {
        ensure_parent_dir(out)?;
        let f = File::create(out).with_context(|| format!("create {}", out.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), &summary)
            .context("serialize run summary")?;
    }

    println!(
        "Replayed {} → {}: {} written ({} bytes of {}), {} capped, {} disabled, {} unavailable, {} errors, {} commands",
        args.script.display(),
        log_path.display(),
        summary.written,
        summary.bytes_written,
        cfg.max_size,
        summary.cap_reached,
        summary.disabled,
        summary.unavailable,
        summary.errors,
        summary.commands.len()
    );
    Ok(())
}

/// Split a log file back into records and print them as JSON Lines.
fn decode(log: &Path, out: Option<&Path>) -> Result<()> {
    let bytes = std::fs::read(log).with_context(|| format!("read {}", log.display()))?;

    let mut w: Box<dyn Write> = match out {
        Some(p) => {
            ensure_parent_dir(p)?;
            let f = File::create(p).with_context(|| format!("create {}", p.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut n = 0usize;
    let mut it = RecordIter::new(&bytes);
    for item in it.by_ref() {
        let rec = item.with_context(|| format!("decoding {}", log.display()))?;
        serde_json::to_writer(&mut w, &rec).context("serialize record to JSON line")?;
        w.write_all(b"\n")?;
        n += 1;
    }
    w.flush()?;

    info!(records = n, bytes = it.offset(), log=%log.display(), "decoded trace log");
    if let Some(p) = out {
        println!("Decoded {n} records → {}", p.display());
    }
    Ok(())
}
