//! Error types for genome-nexus
//!
//! Every error maps onto a stable [`ErrorCode`] so failures can be reported
//! and matched programmatically:
//! - E1xxx: input schema errors (fatal for a run)
//! - E2xxx: record errors (fatal for a single record)
//! - E3xxx: lookup errors (non-fatal at batch granularity)
//! - E9xxx: I/O, configuration and argument errors

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input schema errors (E1xxx)
    /// Required column missing from a header
    MissingColumn = 1001,

    // Record errors (E2xxx)
    /// Record violates a conversion invariant
    MalformedRecord = 2001,
    /// Genomic location could not be parsed
    InvalidLocation = 2002,

    // Lookup errors (E3xxx)
    /// Annotation service call failed
    LookupFailed = 3001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
    /// Configuration file error
    ConfigError = 9003,
    /// Invalid command-line argument
    InvalidArgument = 9004,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MissingColumn => "required column missing from header",
            ErrorCode::MalformedRecord => "malformed variant record",
            ErrorCode::InvalidLocation => "invalid genomic location",
            ErrorCode::LookupFailed => "annotation lookup failed",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
            ErrorCode::ConfigError => "configuration error",
            ErrorCode::InvalidArgument => "invalid argument",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for genome-nexus operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NexusError {
    /// A required column is absent from the input header
    #[error("Missing column in header: {column}")]
    MissingColumn { column: String },

    /// A record violates an invariant of the VCF to MAF conversion
    #[error("Malformed record ({reason}): {record}")]
    MalformedRecord { record: String, reason: String },

    /// A genomic location string could not be parsed
    #[error("Invalid genomic location: {input}")]
    InvalidLocation { input: String },

    /// The annotation service could not be reached or answered with an error
    #[error("Annotation lookup failed: {msg}")]
    Lookup { msg: String },

    /// Invalid command-line argument
    #[error("Invalid argument: {msg}")]
    InvalidArgument { msg: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl NexusError {
    /// Create a malformed record error
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        NexusError::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        NexusError::MissingColumn {
            column: column.into(),
        }
    }

    /// Create a lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        NexusError::Lookup { msg: msg.into() }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            NexusError::MissingColumn { .. } => ErrorCode::MissingColumn,
            NexusError::MalformedRecord { .. } => ErrorCode::MalformedRecord,
            NexusError::InvalidLocation { .. } => ErrorCode::InvalidLocation,
            NexusError::Lookup { .. } => ErrorCode::LookupFailed,
            NexusError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            NexusError::Config { .. } => ErrorCode::ConfigError,
            NexusError::Io { .. } => ErrorCode::IoError,
            NexusError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Get the message prefixed with its error code
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for NexusError {
    fn from(err: std::io::Error) -> Self {
        NexusError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for NexusError {
    fn from(err: serde_json::Error) -> Self {
        NexusError::Json {
            msg: err.to_string(),
        }
    }
}
