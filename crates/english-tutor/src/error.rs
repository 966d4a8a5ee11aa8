//! Error Types for the Tutoring Pipeline

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TutorError>;

/// Pipeline stage that issued a model call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Planning,
    /// Tutoring the response at this zero-based index
    Tutoring(usize),
    Feedback,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "lesson planning"),
            Self::Tutoring(idx) => write!(f, "tutoring response #{}", idx + 1),
            Self::Feedback => write!(f, "feedback"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TutorError {
    /// A model call failed; aborts the session
    #[error("Generation failed during {stage}: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: AgentError,
    },

    #[error("Invalid student profile: {0}")]
    InvalidProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lesson template error: {0}")]
    Template(String),
}

impl TutorError {
    pub const fn generation(stage: Stage, source: AgentError) -> Self {
        Self::Generation { stage, source }
    }

    /// Stage of a generation failure
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Generation { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Convert to a message that is safe to show a student
    pub fn user_message(&self) -> String {
        match self {
            Self::Generation { source, .. } => source.user_message(),
            Self::InvalidProfile(msg) => format!("The student profile is not valid: {msg}"),
            Self::Config(_) | Self::Template(_) => {
                "The tutoring service is misconfigured.".into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_is_one_based() {
        assert_eq!(Stage::Tutoring(0).to_string(), "tutoring response #1");
        assert_eq!(Stage::Planning.to_string(), "lesson planning");
    }

    #[test]
    fn test_generation_error_carries_stage() {
        let err = TutorError::generation(
            Stage::Feedback,
            AgentError::ProviderUnavailable("connection refused".into()),
        );
        assert_eq!(err.stage(), Some(Stage::Feedback));
        assert!(err.to_string().starts_with("Generation failed during feedback"));
        assert!(err.user_message().contains("unavailable"));
    }
}
