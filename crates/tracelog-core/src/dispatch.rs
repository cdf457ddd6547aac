//! Inbound messages and the in-order dispatcher.
//!
//! The transport is the host's business; the logger only needs messages one
//! at a time, in order, from a single consumer. Anything that iterates
//! [`Inbound`] works: a `Vec`, a JSONL script ([`crate::io_jsonl`]), or a
//! `std::sync::mpsc::Receiver` fed by other threads.

use serde::{Deserialize, Serialize};

use crate::error::TraceLogError;
use crate::logger::{CommandResponse, TraceLogger};
use crate::storage::LogStorage;
use crate::types::TraceRecord;
use crate::writer::Disposition;

/// Default opcode for the enable/disable command.
pub const OPCODE_ENABLE_TRACE: u32 = 0x00;
/// Default opcode for the dump command.
pub const OPCODE_DUMP_TRACE_DP: u32 = 0x01;

/// One message delivered to the logger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "msg", rename_all = "snake_case")]
pub enum Inbound {
    /// A trace event.
    Trace(TraceRecord),
    /// Enable/disable command.
    EnableTrace {
        /// Command opcode.
        opcode: u32,
        /// Command sequence number.
        seq: u32,
        /// New gate state.
        enable: bool,
    },
    /// Dump-to-data-product command.
    DumpTraceDp {
        /// Command opcode.
        opcode: u32,
        /// Command sequence number.
        seq: u32,
    },
}

/// Completion for one command, echoed back with its opcode and sequence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandStatus {
    /// Opcode of the completed command.
    pub opcode: u32,
    /// Sequence number of the completed command.
    pub seq: u32,
    /// Outcome.
    pub response: CommandResponse,
}

/// Result of handling one inbound message.
#[derive(Debug)]
pub enum Handled {
    /// Outcome of a trace event.
    Trace(Result<Disposition, TraceLogError>),
    /// Completion of a command.
    Command(CommandStatus),
}

/// Tallies over a drained message sequence.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainSummary {
    /// Records appended.
    pub written: u64,
    /// Bytes appended.
    pub bytes_written: u64,
    /// Records dropped while disabled.
    pub disabled: u64,
    /// Records dropped with no file configured.
    pub unconfigured: u64,
    /// Records dropped after a latched failure.
    pub unavailable: u64,
    /// Records dropped at the cap.
    pub cap_reached: u64,
    /// Records that produced an error (encoding, open or write failure).
    pub errors: u64,
    /// Command completions in arrival order.
    pub commands: Vec<CommandStatus>,
}

impl DrainSummary {
    /// Fold one handled message into the tallies.
    pub fn record(&mut self, h: &Handled) {
        match h {
            Handled::Trace(Ok(d)) => match *d {
                Disposition::Written { bytes } => {
                    self.written += 1;
                    self.bytes_written += bytes as u64;
                }
                Disposition::Disabled => self.disabled += 1,
                Disposition::Unconfigured => self.unconfigured += 1,
                Disposition::Unavailable => self.unavailable += 1,
                Disposition::CapReached => self.cap_reached += 1,
            },
            Handled::Trace(Err(_)) => self.errors += 1,
            Handled::Command(s) => self.commands.push(*s),
        }
    }
}

impl<S: LogStorage> TraceLogger<S> {
    /// Handle exactly one inbound message.
    pub fn dispatch(&mut self, msg: Inbound) -> Handled {
        match msg {
            Inbound::Trace(r) => Handled::Trace(self.log_record(&r)),
            Inbound::EnableTrace {
                opcode,
                seq,
                enable,
            } => Handled::Command(CommandStatus {
                opcode,
                seq,
                response: self.enable_trace(enable),
            }),
            Inbound::DumpTraceDp { opcode, seq } => Handled::Command(CommandStatus {
                opcode,
                seq,
                response: self.dump_trace_dp(),
            }),
        }
    }

    /// Handle messages in order until the source is exhausted.
    pub fn drain<I>(&mut self, msgs: I) -> DrainSummary
    where
        I: IntoIterator<Item = Inbound>,
    {
        let mut summary = DrainSummary::default();
        for msg in msgs {
            let h = self.dispatch(msg);
            summary.record(&h);
        }
        summary
    }
}
