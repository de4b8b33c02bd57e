//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid lineage document{}: {message}", display_path(.path))]
    Lineage {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn lineage(message: impl Into<String>) -> Self {
        Self::Lineage {
            path: None,
            message: message.into(),
        }
    }

    /// Attach the document path to a `Lineage` error; other variants pass through.
    pub fn at_path(self, path: &std::path::Path) -> Self {
        match self {
            Self::Lineage { path: None, message } => Self::Lineage {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
