//! Supervisor
//!
//! Owns lesson planning and is the only place a student profile changes.

use super::{PlanningAgent, TRACKED_FIELDS, tracked_default};
use crate::error::Result;
use crate::model::{FeedbackResult, LessonPlan, StudentProfile};

pub struct SupervisorAgent {
    planner: PlanningAgent,
}

impl SupervisorAgent {
    pub const fn new(planner: PlanningAgent) -> Self {
        Self { planner }
    }

    pub const fn planner(&self) -> &PlanningAgent {
        &self.planner
    }

    pub async fn generate_lesson_plan(&self, profile: &StudentProfile) -> Result<LessonPlan> {
        self.planner.generate_lesson_plan(profile).await
    }

    /// New profile with the tracked fields taken from the feedback, else
    /// kept from the prior profile, else defaulted. Other fields are copied
    /// unchanged.
    pub fn update_profile(profile: &StudentProfile, feedback: &FeedbackResult) -> StudentProfile {
        let mut updated = profile.clone();

        for field in TRACKED_FIELDS {
            let value = feedback
                .field(field)
                .or_else(|| profile.get(field).cloned())
                .unwrap_or_else(|| tracked_default(field));
            updated.set(field, value);
        }

        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompetencyScores, ProfileValue, ScoringApiError};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn feedback(scores: CompetencyScores, updates: &[(&str, ProfileValue)]) -> FeedbackResult {
        FeedbackResult {
            detailed_feedback: "Well done.".into(),
            competency_scores: scores,
            profile_updates: updates
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn profile() -> StudentProfile {
        StudentProfile::new()
            .with("level", "Intermediate")
            .with("progress", 50)
            .with("strengths", "Vocabulary")
            .with("weaknesses", "Pronunciation")
    }

    #[test]
    fn test_empty_feedback_is_idempotent() {
        let empty = feedback(CompetencyScores::Scores(json!({})), &[]);
        assert_eq!(SupervisorAgent::update_profile(&profile(), &empty), profile());
    }

    #[test]
    fn test_feedback_values_win() {
        let fb = feedback(
            CompetencyScores::Scores(json!({"progress": 65, "fluency": 80})),
            &[("weaknesses", ProfileValue::from("Articles"))],
        );
        let updated = SupervisorAgent::update_profile(&profile(), &fb);

        assert_eq!(updated.get("progress"), Some(&ProfileValue::Integer(65)));
        assert_eq!(updated.get("weaknesses"), Some(&ProfileValue::from("Articles")));
        assert_eq!(updated.get("strengths"), Some(&ProfileValue::from("Vocabulary")));
        assert_eq!(updated.get("level"), Some(&ProfileValue::from("Intermediate")));
        assert!(!updated.contains_key("fluency"));
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let failed = feedback(
            CompetencyScores::Failed(ScoringApiError::with_status("Speechsuper API error", 500)),
            &[],
        );
        let updated =
            SupervisorAgent::update_profile(&StudentProfile::new().with("level", "Beginner"), &failed);

        assert_eq!(updated.get("progress"), Some(&ProfileValue::Integer(0)));
        assert_eq!(updated.get("strengths"), Some(&ProfileValue::from("")));
        assert_eq!(updated.get("weaknesses"), Some(&ProfileValue::from("")));
        assert_eq!(updated.len(), 4);
    }

    #[test]
    fn test_input_profile_is_untouched() {
        let original = profile();
        let fb = feedback(CompetencyScores::Scores(json!({})), &[("progress", ProfileValue::Integer(90))]);
        let _ = SupervisorAgent::update_profile(&original, &fb);
        assert_eq!(original, profile());
    }
}
