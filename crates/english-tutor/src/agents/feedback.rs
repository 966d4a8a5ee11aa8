//! Session Feedback
//!
//! Narrative feedback from the model plus external competency scores, both
//! computed over the same performance summary.

use std::collections::BTreeMap;
use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider, PromptChain, PromptTemplate};

use super::TRACKED_FIELDS;
use crate::error::{Result, Stage, TutorError};
use crate::model::{
    FeedbackResult, PerformanceLog, ProfileValue, extract_json_object, strip_reasoning,
};
use crate::prompts::FEEDBACK_TEMPLATE;
use crate::scoring::CompetencyScorer;

pub struct FeedbackAgent {
    chain: PromptChain,
    scorer: Arc<dyn CompetencyScorer>,
}

impl FeedbackAgent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        scorer: Arc<dyn CompetencyScorer>,
    ) -> Self {
        Self {
            chain: PromptChain::new(
                provider,
                PromptTemplate::new(FEEDBACK_TEMPLATE),
                GenerationOptions::for_model(model),
            ),
            scorer,
        }
    }

    /// Feedback over a completed log. A failed model call aborts; a failed
    /// scoring call is reported inside the result.
    pub async fn generate_feedback(&self, logs: &PerformanceLog) -> Result<FeedbackResult> {
        let summary = logs.summary();

        let raw = self
            .chain
            .invoke(&[("performance_data", summary.as_str())])
            .await
            .map_err(|e| TutorError::generation(Stage::Feedback, e))?;
        let detailed_feedback = strip_reasoning(&raw);
        let profile_updates = profile_updates(&detailed_feedback);

        let competency_scores = self.scorer.score(&summary).await;
        if let Some(error) = competency_scores.error() {
            tracing::warn!(
                scorer = %self.scorer.name(),
                error = %error.error,
                status = ?error.status_code,
                "Competency scoring failed, keeping narrative feedback"
            );
        }

        Ok(FeedbackResult {
            detailed_feedback,
            competency_scores,
            profile_updates,
        })
    }
}

/// Tracked profile fields from the JSON object at the end of the feedback
fn profile_updates(feedback: &str) -> BTreeMap<String, ProfileValue> {
    let Some(object) = extract_json_object(feedback) else {
        return BTreeMap::new();
    };

    TRACKED_FIELDS
        .iter()
        .filter_map(|field| {
            let value = object.get(*field)?;
            ProfileValue::from_report(value).map(|v| ((*field).to_string(), v))
        })
        .collect()
}
