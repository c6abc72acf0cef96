//! Error types for the supervisor module.

use thiserror::Error;

/// Result type alias for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Reported when a process dies during the grace period without writing to stderr.
pub const EARLY_EXIT_WITHOUT_OUTPUT: &str =
    "Application exited immediately without error message. Check for missing dependencies.";

/// Errors that can occur while launching or supervising an application.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The source did not parse; carries the validator's diagnostic.
    #[error("{0}")]
    SyntaxInvalid(String),

    #[error("Error launching application: {0}")]
    LaunchFailed(String),

    /// The process was gone before the grace period ended; carries its stderr.
    #[error("{}", early_exit_message(.0))]
    ProcessExitedEarly(String),

    #[error("Error launching application: {0}")]
    Io(#[from] std::io::Error),
}

fn early_exit_message(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        EARLY_EXIT_WITHOUT_OUTPUT.to_string()
    } else {
        format!("Application failed to start: {}", stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_exit_messages() {
        let with_output = SupervisorError::ProcessExitedEarly("ModuleNotFoundError: gradio".into());
        assert_eq!(
            with_output.to_string(),
            "Application failed to start: ModuleNotFoundError: gradio"
        );

        let silent = SupervisorError::ProcessExitedEarly("  \n".into());
        assert_eq!(silent.to_string(), EARLY_EXIT_WITHOUT_OUTPUT);
    }
}
