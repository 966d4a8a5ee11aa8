//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model backend returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model backend could not be reached
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The model answered with nothing usable
    #[error("Empty completion from model '{0}'")]
    EmptyCompletion(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Maximum iterations reached in the tool loop
    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    /// A prompt template could not be rendered
    #[error("Template error: {0}")]
    Template(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Io(_))
    }

    /// Convert to a message that is safe to show a student
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The tutoring model encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The tutoring model is currently unavailable. Please try again.".into()
            }
            Self::EmptyCompletion(_) => "The tutoring model returned an empty answer.".into(),
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::ToolExecution(msg) => format!("Tool error: {msg}"),
            Self::MaxIterations(_) => {
                "The request took too long to process. Please try a simpler question.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}
