//! Role Agents
//!
//! One agent per pipeline stage. Each wraps a [`agent_core::PromptChain`]
//! bound to its own model; the supervisor owns planning and profile updates.

mod feedback;
mod planner;
mod supervisor;
mod tutor;

pub use feedback::FeedbackAgent;
pub use planner::PlanningAgent;
pub use supervisor::SupervisorAgent;
pub use tutor::TutorAgent;

use crate::model::ProfileValue;

/// Profile fields rewritten after every session
pub const TRACKED_FIELDS: [&str; 3] = ["strengths", "weaknesses", "progress"];

/// Value a tracked field takes when neither feedback nor profile has one
pub(crate) fn tracked_default(field: &str) -> ProfileValue {
    if field == "progress" {
        ProfileValue::Integer(0)
    } else {
        ProfileValue::Text(String::new())
    }
}
