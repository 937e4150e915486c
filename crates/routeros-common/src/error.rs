//! Error types for RouterOS synchronization.
//!
//! This module defines the error taxonomy shared by the transports, the
//! command channel and the synchronization engine. All errors implement
//! `std::error::Error` via `thiserror`.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for RouterOS operations.
pub type RosResult<T> = Result<T, RosError>;

/// Errors that can occur while talking to a RouterOS device.
#[derive(Debug, Error)]
pub enum RosError {
    /// Could not establish the transport connection.
    #[error("Failed to connect to {host}: {message}")]
    Connect {
        /// Host (and port) that was dialed.
        host: String,
        /// Underlying failure description.
        message: String,
    },

    /// The device rejected the supplied credentials.
    #[error("Authentication rejected for user '{username}' on {host}")]
    Auth {
        /// Host that rejected the login.
        host: String,
        /// User name that was tried.
        username: String,
    },

    /// A command could not be run or exited with a non-zero status.
    #[error("Command failed: '{command}': {message}")]
    Exec {
        /// The command text.
        command: String,
        /// Failure description (exit status or session error).
        message: String,
    },

    /// A firmware version string did not match the expected grammar.
    #[error("Unparseable RouterOS version '{input}': {message}")]
    VersionParse {
        /// The offending version string.
        input: String,
        /// What was wrong with it.
        message: String,
    },

    /// A declared field failed its validator.
    #[error("Invalid value for field '{field}': {message}")]
    Validation {
        /// The declared field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// A device value could not be converted to the declared field kind.
    #[error("Cannot convert '{value}' for field '{field}': {message}")]
    InvalidValue {
        /// The declared field name.
        field: String,
        /// Raw device value.
        value: String,
        /// Error message.
        message: String,
    },

    /// A filter expected to be unique matched several device items.
    #[error("Filter {filter} on {path} matched {count} items, expected at most one")]
    DataConsistency {
        /// Device path that was queried.
        path: String,
        /// Rendered filter.
        filter: String,
        /// Number of matches returned.
        count: usize,
    },

    /// The object no longer exists on the device.
    #[error("Resource {path} ({key}) no longer exists")]
    NotFound {
        /// Device path.
        path: String,
        /// Natural key or identifier used in the lookup.
        key: String,
    },

    /// All identifier lookup strategies were exhausted.
    #[error("Could not determine the identifier of {path} ({key})")]
    IdentifierUnresolved {
        /// Device path.
        path: String,
        /// Import key supplied by the caller.
        key: String,
        /// Failure of the last strategy tried, if any.
        #[source]
        source: Option<Box<RosError>>,
    },

    /// The structured transport returned an error.
    #[error("Transport error on {method} {path}: {message}")]
    Transport {
        /// Request method name.
        method: String,
        /// Device path.
        path: String,
        /// Error message reported by the client or device.
        message: String,
        /// HTTP-like status code, if any.
        status: Option<u16>,
    },

    /// An operation exceeded its caller-supplied deadline.
    #[error("Operation '{operation}' timed out after {timeout:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The deadline that expired.
        timeout: Duration,
    },

    /// Configuration file or value is invalid.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Local IO failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RosError {
    /// Creates a connect error.
    pub fn connect(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Creates an exec error.
    pub fn exec(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exec {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a version parse error.
    pub fn version_parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VersionParse {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a "no longer exists" error.
    pub fn not_found(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(
        method: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::Transport {
            method: method.into(),
            path: path.into(),
            message: message.into(),
            status,
        }
    }

    /// Creates an "identifier unresolved" error, keeping the last lookup
    /// failure as its source.
    pub fn identifier_unresolved(
        path: impl Into<String>,
        key: impl Into<String>,
        source: Option<RosError>,
    ) -> Self {
        Self::IdentifierUnresolved {
            path: path.into(),
            key: key.into(),
            source: source.map(Box::new),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if the condition is informational and the caller may
    /// decide how to proceed (recreate, retry with other fields, report).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RosError::NotFound { .. } | RosError::IdentifierUnresolved { .. }
        )
    }

    /// Returns true if a lookup found nothing or the device refused the
    /// filter (4xx). Connection, credential, deadline and server failures
    /// are not misses.
    pub fn is_lookup_miss(&self) -> bool {
        match self {
            RosError::NotFound { .. } | RosError::IdentifierUnresolved { .. } => true,
            RosError::Transport {
                status: Some(status),
                ..
            } => (400..500).contains(status),
            _ => false,
        }
    }

    /// Returns true if the device reported that the addressed object does
    /// not exist.
    pub fn is_device_not_found(&self) -> bool {
        match self {
            RosError::NotFound { .. } => true,
            RosError::Transport {
                status: Some(404), ..
            } => true,
            RosError::Transport { message, .. } => message.contains("no such item"),
            _ => false,
        }
    }
}
