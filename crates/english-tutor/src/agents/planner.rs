//! Lesson Planning

use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider, PromptChain, PromptTemplate};

use crate::config::LessonTemplate;
use crate::error::{Result, Stage, TutorError};
use crate::model::{LessonPlan, StudentProfile};
use crate::prompts::LESSON_PLAN_TEMPLATE;

/// Turns a student profile into a lesson plan shaped like the example lesson
pub struct PlanningAgent {
    chain: PromptChain,
    lesson_example: String,
}

impl PlanningAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        template: &LessonTemplate,
    ) -> Self {
        Self {
            chain: PromptChain::new(
                provider,
                PromptTemplate::new(LESSON_PLAN_TEMPLATE),
                GenerationOptions::for_model(model),
            ),
            lesson_example: template.example_json(),
        }
    }

    pub fn model(&self) -> &str {
        self.chain.model()
    }

    /// Generate a lesson plan. The profile must carry at least one field.
    pub async fn generate_lesson_plan(&self, profile: &StudentProfile) -> Result<LessonPlan> {
        if profile.is_empty() {
            return Err(TutorError::InvalidProfile(
                "profile must contain at least one field".into(),
            ));
        }

        let student_profile = profile.to_prompt_string();
        let raw = self
            .chain
            .invoke(&[
                ("student_profile", student_profile.as_str()),
                ("lesson_example", self.lesson_example.as_str()),
            ])
            .await
            .map_err(|e| TutorError::generation(Stage::Planning, e))?;

        let plan = LessonPlan::from_model_output(&raw);
        tracing::debug!(
            model = %self.model(),
            structured = plan.structured().is_some(),
            questions = ?plan.question_count(),
            "Lesson plan generated"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;
    use agent_core::mock::MockProvider;

    fn planner(provider: Arc<MockProvider>) -> PlanningAgent {
        PlanningAgent::new(provider, "planner-model", &LessonTemplate::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_prompt_carries_profile_and_example() {
        let provider = Arc::new(MockProvider::scripted([
            r#"<think>The student is intermediate.</think>
{"lesson": {"context": "Ordering food", "questions": [{"question": "What would you like?"}]}}"#,
        ]));
        let profile = StudentProfile::new()
            .with("level", "Intermediate")
            .with("weaknesses", "Pronunciation");

        let plan = planner(provider.clone())
            .generate_lesson_plan(&profile)
            .await
            .unwrap();

        assert!(!plan.text().contains("<think>"));
        assert_eq!(plan.question_count(), Some(1));

        let calls = provider.calls().await;
        let prompt = &calls[0].last().unwrap().content;
        assert!(prompt.contains("level: Intermediate, weaknesses: Pronunciation"));
        assert!(prompt.contains(r#""lesson""#));
    }

    #[tokio::test]
    async fn test_free_text_plan_is_kept() {
        let provider = Arc::new(MockProvider::scripted(["Practise the past tense."]));
        let profile = StudentProfile::new().with("level", "Beginner");

        let plan = planner(provider).generate_lesson_plan(&profile).await.unwrap();
        assert_eq!(plan.text(), "Practise the past tense.");
        assert!(plan.structured().is_none());
    }

    #[tokio::test]
    async fn test_empty_profile_is_rejected_without_a_model_call() {
        let provider = Arc::new(MockProvider::echo());
        let err = planner(provider.clone())
            .generate_lesson_plan(&StudentProfile::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TutorError::InvalidProfile(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_tagged_with_planning() {
        let provider = Arc::new(MockProvider::failing("connection refused"));
        let profile = StudentProfile::new().with("level", "Beginner");

        let err = planner(provider).generate_lesson_plan(&profile).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Planning));
        assert!(matches!(
            err,
            TutorError::Generation {
                source: AgentError::ProviderUnavailable(_),
                ..
            }
        ));
    }
}
