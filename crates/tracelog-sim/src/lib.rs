//! Inbound-message scripts and synthetic trace traffic for `tracelog`.
//!
//! This crate provides three small building blocks around the core logger:
//!
//! - `script`: a minimal, versioned envelope (`Script`) holding an ordered
//!   list of inbound messages (trace events and commands).
//! - `generator`: a deterministic synthetic traffic generator for tests,
//!   benches and the CLI `simulate` subcommand.
//! - `io`: JSON/CBOR/JSONL read/write helpers for `Script`.
//!
//! We intentionally avoid broad re-exports so callers use stable paths like
//! `tracelog_sim::generator::generate_script`.

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

/// Deterministic synthetic traffic generator.
pub mod generator;
/// JSON/CBOR/JSONL I/O helpers for `Script`.
pub mod io;
/// Versioned script envelope.
pub mod script;
