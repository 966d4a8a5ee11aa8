//! Mock Scorer
//!
//! For tests and offline demos. Returns fixed scores and remembers every
//! summary it was asked to score.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::CompetencyScorer;
use crate::model::{CompetencyScores, ScoringApiError};

pub struct MockScorer {
    response: CompetencyScores,
    summaries: Mutex<Vec<String>>,
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScorer {
    /// Scorer with a fixed, plausible score sheet
    pub fn new() -> Self {
        Self::with_response(CompetencyScores::Scores(serde_json::json!({
            "pronunciation": 72,
            "fluency": 80,
            "grammar": 76,
            "vocabulary": 85
        })))
    }

    pub fn with_response(response: CompetencyScores) -> Self {
        Self {
            response,
            summaries: Mutex::new(Vec::new()),
        }
    }

    /// Scorer that always reports a failed call
    pub fn failing(error: ScoringApiError) -> Self {
        Self::with_response(CompetencyScores::Failed(error))
    }

    /// Summaries received so far, in call order
    pub async fn summaries(&self) -> Vec<String> {
        self.summaries.lock().await.clone()
    }
}

#[async_trait]
impl CompetencyScorer for MockScorer {
    async fn score(&self, performance_summary: &str) -> CompetencyScores {
        self.summaries
            .lock()
            .await
            .push(performance_summary.to_string());
        self.response.clone()
    }

    fn name(&self) -> &str {
        "MockScorer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_scorer_records_summaries() {
        let scorer = MockScorer::new();
        let scores = scorer.score("Response: hi").await;

        assert!(!scores.is_error());
        assert_eq!(scorer.summaries().await, vec!["Response: hi".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_mock_scorer() {
        let scorer = MockScorer::failing(ScoringApiError::with_status("Speechsuper API error", 503));
        assert_eq!(scorer.score("x").await.status_code(), Some(503));
    }
}
