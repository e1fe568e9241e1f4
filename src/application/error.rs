//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Errors from loading data files and settings, plus every domain error.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("invalid hierarchy")]
    Domain(#[from] DomainError),

    #[error("data file not found: {0}")]
    DataNotFound(PathBuf),

    #[error("unsupported data format: {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("cannot parse {context}")]
    Parse {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
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

pub type ApplicationResult<T> = Result<T, ApplicationError>;
