//! # Service Kit
//!
//! Infrastructure for long-running services: a severity-routed
//! structured logging pipeline and a signal-driven graceful-shutdown
//! orchestrator.
//!
//! ## Features
//!
//! - **Multi-Sink Routing**: console streams, append files and rotating
//!   files behind one tee, each with its own severity band
//! - **Structured Records**: one self-describing JSON line per emission,
//!   with static fields and per-call metas under a `meta` group
//! - **Thread Safe**: immutable logger handles, sink-internal locking
//! - **Graceful Shutdown**: ordered cleanup callbacks run exactly once
//!   on a termination signal

pub mod core;
pub mod macros;
pub mod shutdown;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        wrap_metas, FieldValue, Fields, Logger, LoggerBuilder, LoggerError, Meta, Record, Result,
        Severity, TimeLayout,
    };
    pub use crate::shutdown::{ShutdownError, ShutdownHook};
    pub use crate::sinks::{RotationPolicy, Sink, SinkKind, SinkSpec};
}

pub use crate::core::{
    wrap_metas, FieldValue, Fields, Logger, LoggerBuilder, LoggerError, Meta, Record, Result,
    Severity, TimeLayout,
};
pub use crate::shutdown::{ShutdownError, ShutdownHook};
pub use crate::sinks::{RotationPolicy, Sink, SinkKind, SinkSpec};
