//! Error types for the syntax module.

use thiserror::Error;

/// Result type alias for syntax operations.
pub type SyntaxCheckResult<T> = Result<T, SyntaxCheckError>;

/// Errors that can occur outside of the parse itself.
///
/// A source text that fails to parse is not an error; it is reported through
/// [`crate::Validation`].
#[derive(Error, Debug)]
pub enum SyntaxCheckError {
    #[error("Parser initialization failed: {0}")]
    ParserInit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
