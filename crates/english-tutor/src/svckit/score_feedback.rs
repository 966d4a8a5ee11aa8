//! Score Feedback Tool
//!
//! Exposes the competency scorer to the chat agent.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema,
};

use crate::model::CompetencyScores;
use crate::scoring::CompetencyScorer;

pub struct ScoreFeedbackTool {
    scorer: Arc<dyn CompetencyScorer>,
}

impl ScoreFeedbackTool {
    pub const NAME: &'static str = "score_feedback";

    pub fn new(scorer: Arc<dyn CompetencyScorer>) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl Tool for ScoreFeedbackTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.into(),
            description: "Score a student's performance summary for pronunciation, fluency, grammar and vocabulary.".into(),
            parameters: vec![ParameterSchema::required(
                "performance_summary",
                "string",
                "Student responses and tutor feedback to score",
            )],
            category: Some("assessment".into()),
            has_side_effects: true,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let summary = call.str_arg("performance_summary").unwrap_or_default();
        let scores = self.scorer.score(summary).await;
        let data = serde_json::to_value(&scores)?;

        Ok(match scores {
            CompetencyScores::Scores(scores) => {
                ToolResult::success(Self::NAME, format!("Competency scores: {scores}"))
                    .with_data(data)
            }
            CompetencyScores::Failed(error) => {
                let output = match error.status_code {
                    Some(status) => format!("Scoring failed: {} (status {status})", error.error),
                    None => format!("Scoring failed: {}", error.error),
                };
                ToolResult::failure(Self::NAME, output).with_data(data)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoringApiError;
    use crate::scoring::MockScorer;
    use serde_json::json;

    #[tokio::test]
    async fn test_scores_are_returned() {
        let scorer = Arc::new(MockScorer::new());
        let tool = ScoreFeedbackTool::new(scorer.clone());
        let call = ToolCall::new("score_feedback").arg("performance_summary", json!("Response: hi"));

        let result = tool.execute(&call).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("fluency"));
        assert_eq!(scorer.summaries().await, vec!["Response: hi".to_string()]);
    }

    #[tokio::test]
    async fn test_scoring_error_is_a_failed_result() {
        let tool = ScoreFeedbackTool::new(Arc::new(MockScorer::failing(
            ScoringApiError::with_status("Speechsuper API error", 500),
        )));
        let call = ToolCall::new("score_feedback").arg("performance_summary", json!("x"));

        let result = tool.execute(&call).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Scoring failed: Speechsuper API error (status 500)");
        assert_eq!(result.data.unwrap()["status_code"], 500);
    }
}
