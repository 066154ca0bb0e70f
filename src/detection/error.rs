//! Fatal scan errors and recoverable scan warnings

use crate::config::ConfigError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that prevent a scan from starting or completing
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("Root path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to canonicalize {path}: {reason}")]
    Canonicalize { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan task failed: {0}")]
    Join(String),
}

/// A recoverable problem met during a scan; the scan carries on without the path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ScanError::RootNotFound(PathBuf::from("/nope"));
        assert_eq!(err.to_string(), "Root path does not exist: /nope");

        let err = ScanError::from(ConfigError::EmptyList("workspace_markers".to_string()));
        assert!(err.to_string().contains("workspace_markers must contain at least one entry"));
    }

    #[test]
    fn test_warning_serializes() {
        let warning = ScanWarning::new("/ws/locked", "Permission denied");
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["path"], "/ws/locked");
        assert_eq!(json["message"], "Permission denied");
    }
}
