//! Console sink implementation

use crate::core::error::Result;
use std::io::Write;

/// Console stream selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Byte sink over a process console stream.
///
/// Records arrive pre-encoded from the tee. Concurrent writes serialize
/// on the process-wide stdio locks, so a record is never interleaved
/// with another writer on the same stream.
#[derive(Debug)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn stdout() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    pub fn write(&self, buf: &[u8]) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(buf)?;
            }
            ConsoleStream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(buf)?;
            }
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }
}
