//! Log output destinations
//!
//! Sinks are a closed set: console streams, a single append-only file,
//! and a size-rotated file. Each sink serializes its own writes, so the
//! tee can fan a record out from any number of threads without holding a
//! lock of its own.

pub mod console;
pub mod file;
pub mod rotating;

pub use console::{ConsoleSink, ConsoleStream};
pub use file::FileSink;
pub use rotating::{RotatingFileSink, RotationPolicy};

use crate::core::error::Result;
use crate::core::severity::Severity;
use std::path::PathBuf;

/// A concrete write destination for encoded records.
pub enum Sink {
    Console(ConsoleSink),
    File(FileSink),
    Rotating(RotatingFileSink),
}

impl Sink {
    pub fn console_out() -> Self {
        Sink::Console(ConsoleSink::stdout())
    }

    pub fn console_err() -> Self {
        Sink::Console(ConsoleSink::stderr())
    }

    /// Write one encoded record; safe for concurrent callers.
    pub fn write(&self, buf: &[u8]) -> Result<()> {
        match self {
            Sink::Console(sink) => sink.write(buf),
            Sink::File(sink) => sink.write(buf),
            Sink::Rotating(sink) => sink.write(buf),
        }
    }

    /// Flush buffered bytes to the destination.
    pub fn flush(&self) -> Result<()> {
        match self {
            Sink::Console(sink) => sink.flush(),
            Sink::File(sink) => sink.flush(),
            Sink::Rotating(sink) => sink.flush(),
        }
    }
}

/// Destination kind of a [`SinkSpec`]
#[derive(Debug, Clone, PartialEq)]
pub enum SinkKind {
    ConsoleOut,
    ConsoleErr,
    Append(PathBuf),
    Rotate(PathBuf, RotationPolicy),
}

/// One configured destination: kind plus its severity band.
///
/// Specs are assembled once at logger build time and owned by the tee.
/// Console destinations may carry a ceiling, restricting them to the
/// half-open band `[threshold, ceiling)`; file destinations are always
/// open-ended above their threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkSpec {
    pub kind: SinkKind,
    pub threshold: Severity,
    pub ceiling: Option<Severity>,
}

impl SinkSpec {
    pub fn new(kind: SinkKind, threshold: Severity) -> Self {
        Self {
            kind,
            threshold,
            ceiling: None,
        }
    }

    #[must_use]
    pub fn with_ceiling(mut self, ceiling: Severity) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Open the destination this spec describes.
    ///
    /// # Errors
    ///
    /// Directory or file creation failures are construction errors; the
    /// logger factory treats them as fatal.
    pub fn open(&self) -> Result<Sink> {
        match &self.kind {
            SinkKind::ConsoleOut => Ok(Sink::console_out()),
            SinkKind::ConsoleErr => Ok(Sink::console_err()),
            SinkKind::Append(path) => Ok(Sink::File(FileSink::open(path)?)),
            SinkKind::Rotate(path, policy) => {
                Ok(Sink::Rotating(RotatingFileSink::open(path, policy.clone())?))
            }
        }
    }
}
