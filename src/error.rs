//! Error types for HostCpu
//!
//! This module defines the error types returned while loading inventory
//! snapshots, detecting the local topology and handling assignment edits.
//! The reconciliation functions themselves never fail.

use std::path::PathBuf;
use thiserror::Error;

use crate::assign::MissingCoreFunction;

/// Main error type for HostCpu operations
#[derive(Error, Debug)]
pub enum HostCpuError {
    /// I/O error while reading a snapshot or sysfs entry
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inventory snapshot could not be parsed
    #[error("Invalid inventory: {0}")]
    InvalidInventory(String),

    /// CPU range list could not be parsed
    #[error("Invalid CPU list '{input}': {message}")]
    InvalidRange { input: String, message: String },

    /// Requested core assignment was rejected
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    /// A personality-mandated function has no cores
    #[error(transparent)]
    MissingFunction(#[from] MissingCoreFunction),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Report formatting failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Local topology detection error
    #[error("Topology detection error: {0}")]
    DetectionError(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HostCpuError>,
    },
}

impl HostCpuError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a range parsing error
    pub fn range(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::WithContext { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type alias for HostCpu operations
pub type Result<T> = std::result::Result<T, HostCpuError>;

impl From<std::io::Error> for HostCpuError {
    fn from(err: std::io::Error) -> Self {
        HostCpuError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for HostCpuError {
    fn from(err: serde_json::Error) -> Self {
        HostCpuError::InvalidInventory(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| HostCpuError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::CpuFunction;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = HostCpuError::io("/test/host.json", io_err);
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/host.json"));
    }

    #[test]
    fn test_context_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = HostCpuError::io("/sys/devices/system/node", io_err).with_context("detect");
        assert_eq!(err.path().unwrap(), &PathBuf::from("/sys/devices/system/node"));
        assert!(err.to_string().starts_with("detect: "));
    }

    #[test]
    fn test_format_error_converts() {
        let err: HostCpuError = std::fmt::Error.into();
        assert!(matches!(err, HostCpuError::Format(_)));
        assert!(err.to_string().starts_with("Formatting error: "));
    }

    #[test]
    fn test_missing_function_is_transparent() {
        let err: HostCpuError = MissingCoreFunction(CpuFunction::Vswitch).into();
        assert_eq!(err.to_string(), "There must be at least one core for vSwitch.");
    }
}
