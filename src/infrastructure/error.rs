//! Infrastructure-level errors (wraps application errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;

/// Failures at the process boundary, on top of everything the services report.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error("cannot write {target}")]
    Output {
        target: &'static str,
        #[source]
        source: io::Error,
    },
}

impl InfraError {
    pub fn output(target: &'static str, source: io::Error) -> Self {
        Self::Output { target, source }
    }
}

pub type InfraResult<T> = Result<T, InfraError>;
