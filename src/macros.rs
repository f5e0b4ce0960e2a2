//! Logging macros for ergonomic message formatting.
//!
//! These macros provide a convenient interface for logging with
//! automatic string formatting, similar to `println!` and `format!`.
//! Per-call metas go through the `*_with` logger methods instead.
//!
//! # Examples
//!
//! ```
//! use service_kit::prelude::*;
//! use service_kit::info;
//!
//! let logger = Logger::builder().disable_console().build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use service_kit::prelude::*;
/// # let logger = Logger::builder().disable_console().build().unwrap();
/// use service_kit::log;
/// log!(logger, Severity::Info, "Simple message");
/// log!(logger, Severity::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log($severity, format!($($arg)+), $crate::Fields::new())
    };
}

/// Log a debug-severity message.
///
/// # Examples
///
/// ```
/// # use service_kit::prelude::*;
/// # let logger = Logger::builder().disable_console().build().unwrap();
/// use service_kit::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

/// Log an info-severity message.
///
/// # Examples
///
/// ```
/// # use service_kit::prelude::*;
/// # let logger = Logger::builder().disable_console().build().unwrap();
/// use service_kit::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a warn-severity message.
///
/// # Examples
///
/// ```
/// # use service_kit::prelude::*;
/// # let logger = Logger::builder().disable_console().build().unwrap();
/// use service_kit::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

/// Log an error-severity message.
///
/// # Examples
///
/// ```
/// # use service_kit::prelude::*;
/// # let logger = Logger::builder().disable_console().build().unwrap();
/// use service_kit::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a fatal-severity message, flushing sinks and exiting the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Fatal, $($arg)+)
    };
}
