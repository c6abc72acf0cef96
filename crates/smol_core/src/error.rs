//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while setting up the pipeline.
///
/// Pipeline operations themselves report failures as text; these only occur
/// while loading configuration or building the agent.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error(transparent)]
    Llm(#[from] smol_llm::LlmError),

    #[error(transparent)]
    Supervisor(#[from] smol_runner::SupervisorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
