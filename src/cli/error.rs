//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("Invalid input")]
    InvalidInput(#[source] DomainError),

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
    pub fn not_enough_arguments() -> Self {
        CliError::Usage("Not enough arguments".to_string())
    }

    /// Missing or malformed command arguments.
    pub fn is_argument_error(&self) -> bool {
        matches!(self, CliError::Usage(_) | CliError::InvalidInput(_))
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::InvalidInput(_) => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Database { .. } | InfraError::NotInitialized(_) => {
                    crate::exitcode::UNAVAILABLE
                }
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(ApplicationError::Config { .. }) => {
                    crate::exitcode::CONFIG
                }
                InfraError::Application(ApplicationError::Domain(_)) => crate::exitcode::DATAERR,
                InfraError::Application(ApplicationError::OperationFailed { .. }) => {
                    crate::exitcode::UNAVAILABLE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_invalid_grade_when_displayed_then_says_invalid_input() {
        let err = CliError::InvalidInput(DomainError::InvalidGrade("abc".into()));
        assert_eq!(err.to_string(), "Invalid input");
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_arguments_when_displayed_then_says_not_enough_arguments() {
        let err = CliError::not_enough_arguments();
        assert_eq!(err.to_string(), "Not enough arguments");
        assert_eq!(err.exit_code(), crate::exitcode::USAGE);
    }

    #[test]
    fn given_config_error_when_exit_code_then_config() {
        let err: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }
}
