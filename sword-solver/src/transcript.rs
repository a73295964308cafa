//! Append-only log of API calls.
//!
//! Each call becomes one JSON object on its own line, numbered in call
//! order. The log is meant for replaying a failing session by hand; its
//! exact layout may change between versions.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use sword_core::{Node, Opcode, Result, Signal, Sort, SwordError};

/// One recorded call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call<'a> {
    /// A signal was created.
    Signal {
        /// The new handle.
        signal: Signal,
        /// Its opcode.
        op: Opcode,
        /// Its sort.
        sort: Sort,
        /// Operand handles.
        operands: &'a [Signal],
        /// Numeric parameters.
        params: &'a [u32],
        /// Hex value of constants.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        /// Name of variables.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
    },
    /// `add_assertion`
    Assert {
        /// Asserted signal.
        signal: Signal,
        /// Polarity.
        polarity: bool,
    },
    /// `add_assumption`
    Assume {
        /// Assumed signal.
        signal: Signal,
        /// Polarity.
        polarity: bool,
    },
    /// `add_and_assert_module`
    Module {
        /// Module name.
        name: &'a str,
        /// Enable signal handed back to the caller.
        enable: Signal,
    },
    /// `solve`
    Solve {
        /// Assumptions consumed by the call.
        assumptions: usize,
        /// Outcome; absent when a module aborted the search.
        result: Option<bool>,
    },
}

impl<'a> Call<'a> {
    /// Record of a freshly created node.
    #[must_use]
    pub fn signal(signal: Signal, node: &'a Node) -> Self {
        Call::Signal {
            signal,
            op: node.op(),
            sort: node.sort(),
            operands: node.operands(),
            params: node.params(),
            value: node.value().map(|v| format!("{v:x}")),
            name: node.name(),
        }
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    seq: u64,
    #[serde(flatten)]
    call: &'a Call<'a>,
}

/// Writer-backed transcript owned by one solver.
pub struct Transcript {
    out: Box<dyn Write>,
    seq: u64,
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript").field("seq", &self.seq).finish_non_exhaustive()
    }
}

impl Transcript {
    /// Log into `out`.
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out, seq: 0 }
    }

    /// Number of calls recorded.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.seq
    }

    /// Whether nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seq == 0
    }

    /// Append `call` as one line and flush.
    pub fn record(&mut self, call: &Call<'_>) -> Result<()> {
        let entry = Entry {
            seq: self.seq,
            call,
        };
        serde_json::to_writer(&mut self.out, &entry)
            .map_err(|e| SwordError::TranscriptIo(e.to_string()))?;
        writeln!(self.out).map_err(|e| SwordError::TranscriptIo(e.to_string()))?;
        self.out
            .flush()
            .map_err(|e| SwordError::TranscriptIo(e.to_string()))?;
        self.seq += 1;
        Ok(())
    }
}
