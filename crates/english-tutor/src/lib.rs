//! # english-tutor
//!
//! Multi-agent English tutoring: a lesson is planned from the student's
//! profile, each student response is tutored, and the session closes with
//! narrative feedback, external competency scores and an updated profile.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  LanguageLearningSession                                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │  SupervisorAgent ─► PlanningAgent     profile   ─► plan       │
//! │  TutorAgent                           responses ─► log        │
//! │  FeedbackAgent   ─► CompetencyScorer  log       ─► feedback   │
//! │  SupervisorAgent::update_profile      feedback  ─► profile'   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every agent gets its model client injected as an
//! `Arc<dyn LlmProvider>`; the scorer is an `Arc<dyn CompetencyScorer>`.

pub mod agents;
pub mod config;
pub mod error;
pub mod model;
pub mod prompts;
pub mod scoring;
pub mod session;
pub mod svckit;

pub use agents::{FeedbackAgent, PlanningAgent, SupervisorAgent, TutorAgent};
pub use config::{LessonTemplate, ModelConfig, ScoringBackend, ScoringConfig, TutorConfig, TutorErrorPolicy};
pub use error::{Result, Stage, TutorError};
pub use model::{
    CompetencyScores, FeedbackResult, LessonPlan, PerformanceLog, PerformanceLogEntry,
    ProfileValue, ScoringApiError, SessionResult, StudentProfile,
};
pub use scoring::{CompetencyScorer, MockScorer, SpeechsuperClient};
pub use session::LanguageLearningSession;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{ScoreFeedbackTool, WebSearchTool};
    pub use agent_core::tool::ArithmeticTool;
}
