//! Error types for the logging pipeline

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sink could not be constructed
    #[error("Failed to open sink '{path}': {message}")]
    SinkOpen { path: String, message: String },

    /// File rotation error
    #[error("Rotation failed for '{path}': {message}")]
    Rotation { path: String, message: String },

    /// A single record larger than the rotation size cap
    #[error("Record of {size} bytes exceeds rotation cap of {max} bytes")]
    RecordTooLarge { size: usize, max: u64 },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink construction error
    pub fn sink_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a rotation error
    pub fn rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Rotation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::sink_open("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::SinkOpen { .. }));

        let err = LoggerError::rotation("/var/log/app.log", "Disk full");
        assert!(matches!(err, LoggerError::Rotation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::sink_open("/var/log/app.log", "Permission denied");
        assert_eq!(
            err.to_string(),
            "Failed to open sink '/var/log/app.log': Permission denied"
        );

        let err = LoggerError::RecordTooLarge { size: 2048, max: 1024 };
        assert_eq!(
            err.to_string(),
            "Record of 2048 bytes exceeds rotation cap of 1024 bytes"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("creating log directory", "cannot create directory", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("creating log directory"));
        assert!(err.to_string().contains("cannot create directory"));
    }
}
