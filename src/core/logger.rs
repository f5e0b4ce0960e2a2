//! Logger factory and the immutable logger handle
//!
//! `LoggerBuilder` collects configuration options in call order and
//! assembles the tee once; the resulting `Logger` is an immutable,
//! cheaply clonable handle that is safe to share across worker threads.

use super::error::Result;
use super::field::Fields;
use super::record::{short_caller, Record};
use super::router::{Tee, TeeLeaf};
use super::severity::Severity;
use super::timestamp::TimeLayout;
use crate::sinks::{RotationPolicy, SinkKind, SinkSpec};
use chrono::Local;
use serde_json::{Map, Value};
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

struct Shared {
    tee: Tee,
    layout: TimeLayout,
}

/// Configuration accumulator for [`Logger::builder`].
///
/// Options apply in call order: singular fields (severity floor, time
/// layout) are overwritten by later calls, plural fields (static fields,
/// file destinations) accumulate. Static fields collide last-writer-wins.
pub struct LoggerBuilder {
    floor: Severity,
    layout: TimeLayout,
    static_fields: Vec<(String, String)>,
    files: Vec<SinkKind>,
    console_disabled: bool,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            floor: Severity::Info,
            layout: TimeLayout::default(),
            static_fields: Vec::new(),
            files: Vec::new(),
            console_disabled: false,
        }
    }
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the severity floor (default Info).
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn minimum_severity(mut self, floor: Severity) -> Self {
        self.floor = floor;
        self
    }

    /// Add a static field carried by every record this logger emits.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn static_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_fields.push((key.into(), value.into()));
        self
    }

    /// Set the record time layout (default RFC 3339).
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn time_layout(mut self, layout: impl Into<TimeLayout>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Add a single append-file destination.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn file_sink_append(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(SinkKind::Append(path.into()));
        self
    }

    /// Add a size-rotated file destination.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn file_sink_rotate(mut self, path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        self.files.push(SinkKind::Rotate(path.into(), policy));
        self
    }

    /// Drop the default console destinations.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn disable_console(mut self) -> Self {
        self.console_disabled = true;
        self
    }

    /// Assemble the logger.
    ///
    /// Console-out takes the band `[floor, Error)` and console-err
    /// `[max(floor, Error), ∞)`, so sub-error records go to stdout and
    /// error-and-above to stderr. Every file destination captures the
    /// open-ended band `[floor, ∞)`.
    ///
    /// # Errors
    ///
    /// Any sink construction failure aborts the build; a logger with an
    /// unusable destination would leave the process unobservable.
    pub fn build(self) -> Result<Logger> {
        let mut specs = Vec::new();
        if !self.console_disabled {
            specs.push(
                SinkSpec::new(SinkKind::ConsoleOut, self.floor).with_ceiling(Severity::Error),
            );
            specs.push(SinkSpec::new(
                SinkKind::ConsoleErr,
                self.floor.max(Severity::Error),
            ));
        }
        for kind in self.files {
            specs.push(SinkSpec::new(kind, self.floor));
        }

        let mut leaves = Vec::with_capacity(specs.len());
        for spec in &specs {
            let sink = spec.open()?;
            leaves.push(match spec.ceiling {
                Some(ceiling) => TeeLeaf::banded(sink, spec.threshold, ceiling),
                None => TeeLeaf::open(sink, spec.threshold),
            });
        }

        let mut fields = Map::new();
        for (key, value) in self.static_fields {
            fields.insert(key, Value::String(value));
        }

        Ok(Logger {
            shared: Arc::new(Shared {
                tee: Tee::new(leaves),
                layout: self.layout,
            }),
            fields: Arc::new(fields),
        })
    }
}

/// Immutable, concurrency-safe logging handle.
///
/// Cloning is cheap; all clones share the same tee. Deriving a logger
/// with [`Logger::with_field`] never mutates the parent, so references
/// held elsewhere never observe another caller's added fields.
///
/// # Examples
///
/// ```no_run
/// use service_kit::prelude::*;
///
/// let logger = Logger::builder()
///     .minimum_severity(Severity::Info)
///     .static_field("domain", "api[prod]")
///     .file_sink_append("/var/log/app/access.log")
///     .build()
///     .unwrap();
///
/// logger.info("server started");
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    fields: Arc<Map<String, Value>>,
}

impl Logger {
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Derive a logger carrying an additional static field.
    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<String>) -> Logger {
        let mut fields = (*self.fields).clone();
        fields.insert(key.into(), Value::String(value.into()));
        Logger {
            shared: Arc::clone(&self.shared),
            fields: Arc::new(fields),
        }
    }

    /// Emit one record.
    ///
    /// No filtering happens here; every call reaches the tee, which
    /// decides per destination. Sink failures never propagate to the
    /// caller. A Fatal record additionally flushes all destinations and
    /// terminates the process.
    #[track_caller]
    pub fn log(&self, severity: Severity, msg: impl Into<String>, fields: Fields) {
        let caller = Location::caller();
        self.dispatch(severity, msg.into(), fields, caller);
        if severity == Severity::Fatal {
            let _ = self.sync();
            std::process::exit(1);
        }
    }

    #[track_caller]
    pub fn debug(&self, msg: impl Into<String>) {
        self.log(Severity::Debug, msg, Fields::new());
    }

    #[track_caller]
    pub fn debug_with(&self, msg: impl Into<String>, fields: Fields) {
        self.log(Severity::Debug, msg, fields);
    }

    #[track_caller]
    pub fn info(&self, msg: impl Into<String>) {
        self.log(Severity::Info, msg, Fields::new());
    }

    #[track_caller]
    pub fn info_with(&self, msg: impl Into<String>, fields: Fields) {
        self.log(Severity::Info, msg, fields);
    }

    #[track_caller]
    pub fn warn(&self, msg: impl Into<String>) {
        self.log(Severity::Warn, msg, Fields::new());
    }

    #[track_caller]
    pub fn warn_with(&self, msg: impl Into<String>, fields: Fields) {
        self.log(Severity::Warn, msg, fields);
    }

    #[track_caller]
    pub fn error(&self, msg: impl Into<String>) {
        self.log(Severity::Error, msg, Fields::new());
    }

    #[track_caller]
    pub fn error_with(&self, msg: impl Into<String>, fields: Fields) {
        self.log(Severity::Error, msg, fields);
    }

    /// Emit a Fatal record, flush all destinations and exit the process.
    #[track_caller]
    pub fn fatal(&self, msg: impl Into<String>) -> ! {
        self.fatal_with(msg, Fields::new())
    }

    /// Like [`Logger::fatal`] with per-call fields.
    #[track_caller]
    pub fn fatal_with(&self, msg: impl Into<String>, fields: Fields) -> ! {
        let caller = Location::caller();
        self.dispatch(Severity::Fatal, msg.into(), fields, caller);
        let _ = self.sync();
        std::process::exit(1);
    }

    /// Flush every destination.
    ///
    /// The logger never closes or flushes sinks on its own; the external
    /// owner calls this, typically as the last shutdown callback.
    pub fn sync(&self) -> Result<()> {
        self.shared.tee.flush_all()
    }

    fn dispatch(&self, severity: Severity, msg: String, fields: Fields, caller: &Location<'_>) {
        let record = Record::assemble(
            severity,
            msg,
            short_caller(caller.file(), caller.line()),
            &Local::now(),
            &self.shared.layout,
            &self.fields,
            &fields,
        );
        match record.to_line() {
            Ok(line) => self.shared.tee.dispatch(severity, &line),
            Err(e) => eprintln!("[LOGGER ERROR] Record encoding failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{wrap_metas, Meta};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_builder_defaults() {
        let builder = LoggerBuilder::new();
        assert_eq!(builder.floor, Severity::Info);
        assert_eq!(builder.layout, TimeLayout::Rfc3339);
        assert!(!builder.console_disabled);
        assert!(builder.files.is_empty());
    }

    #[test]
    fn test_later_singular_option_overrides() {
        let builder = LoggerBuilder::new()
            .minimum_severity(Severity::Debug)
            .time_layout("%H:%M:%S")
            .minimum_severity(Severity::Error);
        assert_eq!(builder.floor, Severity::Error);
        assert_eq!(builder.layout, TimeLayout::Custom("%H:%M:%S".to_string()));
    }

    #[test]
    fn test_static_fields_accumulate_last_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fields.log");
        let logger = Logger::builder()
            .disable_console()
            .static_field("env", "dev")
            .static_field("domain", "api")
            .static_field("env", "prod")
            .file_sink_append(&path)
            .build()
            .unwrap();

        logger.info("fields check");
        logger.sync().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["meta"]["env"], "prod");
        assert_eq!(parsed["meta"]["domain"], "api");
    }

    #[test]
    fn test_zero_sink_logger_is_valid() {
        let logger = Logger::builder().disable_console().build().unwrap();
        logger.info("goes nowhere");
        logger.error("also nowhere");
        logger.sync().unwrap();
    }

    #[test]
    fn test_build_fails_on_unusable_destination() {
        let dir = tempdir().unwrap();
        // The directory itself is not openable as an append file
        let result = Logger::builder()
            .disable_console()
            .file_sink_append(dir.path())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_derived_logger_leaves_parent_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derive.log");
        let parent = Logger::builder()
            .disable_console()
            .file_sink_append(&path)
            .build()
            .unwrap();

        let child = parent.with_field("request_id", "abc-123");
        parent.info("from parent");
        child.info("from child");
        parent.sync().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert!(first["meta"].get("request_id").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["meta"]["request_id"], "abc-123");
    }

    #[test]
    fn test_emission_carries_error_and_metas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.log");
        let logger = Logger::builder()
            .disable_console()
            .file_sink_append(&path)
            .build()
            .unwrap();

        let err = std::io::Error::new(std::io::ErrorKind::Other, "pool exhausted");
        logger.error_with(
            "db query failed",
            wrap_metas(Some(&err), vec![Meta::new("query_ms", 250)]),
        );
        logger.sync().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["error"], "pool exhausted");
        assert_eq!(parsed["meta"]["query_ms"], 250);
        assert_eq!(parsed["level"], "error");
    }

    #[test]
    fn test_caller_is_this_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("caller.log");
        let logger = Logger::builder()
            .disable_console()
            .file_sink_append(&path)
            .build()
            .unwrap();

        logger.info("caller check");
        logger.sync().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        let caller = parsed["caller"].as_str().unwrap();
        assert!(caller.contains("logger.rs:"), "unexpected caller: {}", caller);
    }
}
