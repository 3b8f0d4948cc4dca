use crate::{config::ConfigError, core::error::ErrorCode, core::plan::BuildErrors};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type: a stable kind plus the rendered diagnostic.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Codes of every field diagnostic, in declaration order. Empty for
    /// configuration errors.
    #[must_use]
    pub fn codes(&self) -> &[ErrorCode] {
        match &self.kind {
            ErrorKind::Build { codes, .. } => codes,
            ErrorKind::Config => &[],
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, err.to_string())
    }
}

impl From<BuildErrors> for Error {
    fn from(err: BuildErrors) -> Self {
        Self::new(
            ErrorKind::Build {
                projection: err.projection.clone(),
                codes: err.codes(),
            },
            err.to_string(),
        )
    }
}

///
/// ErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The configuration file could not be read or parsed.
    Config,

    /// One or more target fields of `projection` failed to resolve.
    Build {
        projection: String,
        codes: Vec<ErrorCode>,
    },
}
