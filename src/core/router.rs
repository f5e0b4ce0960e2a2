//! Severity-banded fan-out to sinks
//!
//! The tee matches each record against every leaf's severity band and
//! delivers the encoded bytes to each accepting sink exactly once. It
//! holds no lock of its own; mutual exclusion lives inside the sinks.

use super::severity::Severity;
use crate::core::error::{LoggerError, Result};
use crate::sinks::Sink;

/// One fan-out target: a sink plus the severity band it accepts.
pub struct TeeLeaf {
    sink: Sink,
    floor: Severity,
    ceiling: Option<Severity>,
}

impl TeeLeaf {
    /// Leaf accepting everything at or above `floor`.
    pub fn open(sink: Sink, floor: Severity) -> Self {
        Self {
            sink,
            floor,
            ceiling: None,
        }
    }

    /// Leaf restricted to the half-open band `[floor, ceiling)`.
    pub fn banded(sink: Sink, floor: Severity, ceiling: Severity) -> Self {
        Self {
            sink,
            floor,
            ceiling: Some(ceiling),
        }
    }

    pub fn accepts(&self, severity: Severity) -> bool {
        severity >= self.floor && self.ceiling.map_or(true, |c| severity < c)
    }
}

/// Fan-out router over severity-banded leaves.
///
/// A tee with zero leaves is valid and silently drops every record; the
/// console-disabled, no-file configuration builds exactly that.
pub struct Tee {
    leaves: Vec<TeeLeaf>,
}

impl Tee {
    pub fn new(leaves: Vec<TeeLeaf>) -> Self {
        Self { leaves }
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Deliver one encoded record to every accepting leaf.
    ///
    /// A sink failure never propagates to the emitting caller; it is
    /// reported to the fallback stream and the remaining leaves still
    /// receive the record.
    pub fn dispatch(&self, severity: Severity, buf: &[u8]) {
        for (idx, leaf) in self.leaves.iter().enumerate() {
            if !leaf.accepts(severity) {
                continue;
            }
            if let Err(e) = leaf.sink.write(buf) {
                eprintln!("[LOGGER ERROR] Sink #{} write failed: {}", idx, e);
            }
        }
    }

    /// Flush every leaf, returning the first failure.
    pub fn flush_all(&self) -> Result<()> {
        let mut first_err: Option<LoggerError> = None;
        for (idx, leaf) in self.leaves.iter().enumerate() {
            if let Err(e) = leaf.sink.flush() {
                eprintln!("[LOGGER ERROR] Sink #{} flush failed: {}", idx, e);
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
