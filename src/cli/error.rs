//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(InfraError::Output { .. }) => crate::exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(_)
                | ApplicationError::UnsupportedFormat(_)
                | ApplicationError::Parse { .. } => crate::exitcode::DATAERR,
                ApplicationError::DataNotFound(_) => crate::exitcode::NOINPUT,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::path::PathBuf;

    #[test]
    fn given_layered_errors_when_mapping_exit_code_then_follows_sysexits() {
        let missing: CliError = ApplicationError::DataNotFound(PathBuf::from("x.json")).into();
        let invalid: CliError =
            ApplicationError::Domain(DomainError::DuplicateNode("A.b".to_string())).into();
        let config: CliError = ApplicationError::Config {
            message: "bad".to_string(),
        }
        .into();
        let output: CliError = InfraError::output(
            "stdout",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
        )
        .into();

        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);
        assert_eq!(invalid.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(config.exit_code(), crate::exitcode::CONFIG);
        assert_eq!(output.exit_code(), crate::exitcode::IOERR);
        assert_eq!(
            CliError::Usage("no data".to_string()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
