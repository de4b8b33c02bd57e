//! Infrastructure-level errors (wraps application errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::FormatError;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[source] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// A failed read whose I/O error carries a [`FormatError`] becomes `Format`.
impl From<ApplicationError> for InfraError {
    fn from(e: ApplicationError) -> Self {
        if let Some(format) = format_error(&e) {
            return Self::Format {
                path: format.path.clone(),
                message: format.message.clone(),
            };
        }
        Self::Application(e)
    }
}

fn format_error(e: &ApplicationError) -> Option<&FormatError> {
    let ApplicationError::OperationFailed { source, .. } = e else {
        return None;
    };
    source
        .downcast_ref::<std::io::Error>()?
        .get_ref()?
        .downcast_ref::<FormatError>()
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::*;
    use crate::application::IoResultExt;

    #[test]
    fn given_format_payload_when_converting_then_format_error() {
        let failed: Result<(), _> = Err(io::Error::new(
            io::ErrorKind::InvalidData,
            FormatError {
                path: "root.fa".into(),
                message: "line 1: no header".into(),
            },
        ));
        let err = InfraError::from(
            failed
                .with_path_context("read root sequence", Path::new("root.fa"))
                .unwrap_err(),
        );

        match err {
            InfraError::Format { path, message } => {
                assert_eq!(path, Path::new("root.fa"));
                assert_eq!(message, "line 1: no header");
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn given_plain_io_failure_when_converting_then_stays_application() {
        let failed: Result<(), _> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = InfraError::from(
            failed
                .with_path_context("read root sequence", Path::new("root.fa"))
                .unwrap_err(),
        );

        assert!(matches!(
            err,
            InfraError::Application(ApplicationError::OperationFailed { .. })
        ));
    }
}
