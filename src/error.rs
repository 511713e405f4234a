//! Error types for loading, sharing and exporting analysis results.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown to users when a share link cannot be read.
pub const CORRUPT_LINK_MESSAGE: &str = "The shared analysis link is invalid or corrupted.";

/// Stage of the share-token decode pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Base64,
    Inflate,
    Json,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStage::Base64 => write!(f, "base64 decoding"),
            DecodeStage::Inflate => write!(f, "decompression"),
            DecodeStage::Json => write!(f, "result parsing"),
        }
    }
}

/// Errors that can occur while handling analysis results.
#[derive(Debug, Error)]
pub enum Error {
    /// A share token failed to decode at some stage.
    #[error("corrupt share token ({stage} failed): {reason}")]
    CorruptShareToken { stage: DecodeStage, reason: String },

    /// A result was missing required fields or had the wrong shape.
    #[error("malformed analysis result: {0}")]
    MalformedResult(#[source] serde_json::Error),

    /// Compressing a share token failed.
    #[error("failed to build share token: {0}")]
    ShareEncoding(#[from] std::io::Error),

    /// An export artifact could not be written.
    #[error("failed to write export to {}: {source}", .path.display())]
    ExportWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a corrupt-token error for the given stage.
    pub fn corrupt_token(stage: DecodeStage, reason: impl ToString) -> Self {
        Self::CorruptShareToken {
            stage,
            reason: reason.to_string(),
        }
    }

    /// True when the error came from a bad share link.
    pub fn is_corrupt_share_token(&self) -> bool {
        matches!(self, Error::CorruptShareToken { .. })
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Error::CorruptShareToken { .. } => CORRUPT_LINK_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_token_is_distinguishable() {
        let err = Error::corrupt_token(DecodeStage::Inflate, "invalid stored block lengths");
        assert!(err.is_corrupt_share_token());
        assert_eq!(err.user_message(), CORRUPT_LINK_MESSAGE);
        assert!(err.to_string().contains("decompression failed"));
    }

    #[test]
    fn test_write_failure_names_path() {
        let err = Error::ExportWriteFailure {
            path: PathBuf::from("out/report.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_corrupt_share_token());
        assert!(err.user_message().contains("out/report.html"));
    }
}
