//! Language Learning Session
//!
//! Runs one session end to end:
//!
//! ```text
//! profile ──► plan ──► tutor each response ──► feedback ──► updated profile
//! ```
//!
//! Stages run strictly in sequence; feedback only starts once the whole
//! performance log exists.

use std::sync::Arc;

use agent_core::LlmProvider;
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::agents::{FeedbackAgent, PlanningAgent, SupervisorAgent, TutorAgent};
use crate::config::TutorConfig;
use crate::error::Result;
use crate::model::{SessionResult, StudentProfile};
use crate::scoring::CompetencyScorer;

pub struct LanguageLearningSession {
    supervisor: SupervisorAgent,
    tutor: TutorAgent,
    feedback: FeedbackAgent,
}

impl LanguageLearningSession {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        scorer: Arc<dyn CompetencyScorer>,
        config: &TutorConfig,
    ) -> Self {
        let planner = PlanningAgent::new(
            provider.clone(),
            config.models.planner.clone(),
            &config.lesson_template,
        );

        Self {
            supervisor: SupervisorAgent::new(planner),
            tutor: TutorAgent::new(
                provider.clone(),
                config.models.tutor.clone(),
                config.error_policy,
                config.concurrency,
            ),
            feedback: FeedbackAgent::new(provider, config.models.feedback.clone(), scorer),
        }
    }

    pub async fn run_session(
        &self,
        profile: &StudentProfile,
        responses: &[String],
    ) -> Result<SessionResult> {
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("session", %session_id);
        let result = self
            .run(session_id, profile, responses)
            .instrument(span)
            .await;

        if let Err(e) = &result {
            tracing::error!(%session_id, stage = ?e.stage(), error = %e, "Session failed");
        }
        result
    }

    async fn run(
        &self,
        session_id: Uuid,
        profile: &StudentProfile,
        responses: &[String],
    ) -> Result<SessionResult> {
        let started_at = Utc::now();
        tracing::info!(responses = responses.len(), "Session started");

        let lesson_plan = self.supervisor.generate_lesson_plan(profile).await?;
        tracing::info!(questions = ?lesson_plan.question_count(), "Lesson planned");

        let performance_logs = self.tutor.conduct_lesson(&lesson_plan, responses).await?;
        tracing::info!(
            entries = performance_logs.len(),
            failed = performance_logs.failure_count(),
            "Lesson conducted"
        );

        let feedback = self.feedback.generate_feedback(&performance_logs).await?;
        tracing::info!(scoring_failed = feedback.competency_scores.is_error(), "Feedback generated");

        let updated_profile = SupervisorAgent::update_profile(profile, &feedback);
        let finished_at = Utc::now();
        tracing::info!(
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Session finished"
        );

        Ok(SessionResult {
            session_id,
            lesson_plan,
            performance_logs,
            feedback,
            updated_profile,
            started_at,
            finished_at,
        })
    }
}
