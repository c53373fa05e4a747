//! Error types for the extraction workflow
//!
//! Every error here is recoverable: the App turns it into a dismissible alert
//! and the workflow stays usable.

use crate::model::modal::AlertKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejection of a candidate file during intake
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error("Please upload an image file")]
    NotAnImage { mime: String },

    #[error("{name} is {size_mb:.1} MB, the upload limit is {limit_mb} MB")]
    TooLarge {
        name: String,
        size_mb: f64,
        limit_mb: u64,
    },

    #[error("Could not read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("No file was dropped")]
    NothingDropped,
}

impl IntakeError {
    pub fn alert_kind(&self) -> AlertKind {
        AlertKind::Validation
    }
}

/// Failure to obtain an extraction result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Please upload an image first")]
    EmptyInput,

    /// The service answered but reported (or implied) a failure
    #[error("{0}")]
    Server(String),

    /// The request could not complete
    #[error("{0}")]
    Transport(String),

    #[error("The extraction service did not answer within {0}s")]
    Timeout(u64),
}

impl ExtractionError {
    pub fn alert_kind(&self) -> AlertKind {
        match self {
            ExtractionError::EmptyInput => AlertKind::EmptyInput,
            ExtractionError::Server(_) => AlertKind::Server,
            ExtractionError::Transport(_) | ExtractionError::Timeout(_) => AlertKind::Transport,
        }
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest's Display omits the underlying cause; append the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message = format!("{}: {}", message, cause);
            source = std::error::Error::source(cause);
        }
        ExtractionError::Transport(message)
    }
}

/// Failure while writing an export artifact
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export failed: {0}")]
    Io(#[from] io::Error),

    #[error("Could not serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not save {}: {}", path.display(), source)]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl ExportError {
    pub fn alert_kind(&self) -> AlertKind {
        AlertKind::Export
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_alert_text() {
        let err = IntakeError::NotAnImage {
            mime: "application/pdf".to_string(),
        };
        assert_eq!(err.to_string(), "Please upload an image file");
        assert_eq!(
            ExtractionError::EmptyInput.to_string(),
            "Please upload an image first"
        );
        assert_eq!(
            ExtractionError::Server("No text detected".to_string()).to_string(),
            "No text detected"
        );
    }

    #[test]
    fn test_alert_kinds() {
        assert_eq!(ExtractionError::EmptyInput.alert_kind(), AlertKind::EmptyInput);
        assert_eq!(
            ExtractionError::Server(String::new()).alert_kind(),
            AlertKind::Server
        );
        assert_eq!(ExtractionError::Timeout(5).alert_kind(), AlertKind::Transport);
        assert_eq!(IntakeError::NothingDropped.alert_kind(), AlertKind::Validation);
    }
}
