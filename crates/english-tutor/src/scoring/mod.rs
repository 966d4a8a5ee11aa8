//! Competency Scoring
//!
//! External scoring of a lesson's performance summary (pronunciation,
//! fluency, …). Scorers never fail: problems come back as
//! [`CompetencyScores::Failed`] so the narrative feedback still reaches the
//! student.

mod mock;
mod speechsuper;

pub use mock::MockScorer;
pub use speechsuper::{SCORING_API_ERROR, SpeechsuperClient};

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ScoringBackend, ScoringConfig};
use crate::error::Result;
use crate::model::CompetencyScores;

/// Scorer trait (Strategy pattern)
#[async_trait]
pub trait CompetencyScorer: Send + Sync {
    /// Score a performance summary
    async fn score(&self, performance_summary: &str) -> CompetencyScores;

    fn name(&self) -> &str;
}

/// Build the scorer selected by configuration
pub fn from_config(config: &ScoringConfig) -> Result<Arc<dyn CompetencyScorer>> {
    Ok(match config.backend {
        ScoringBackend::Http => Arc::new(SpeechsuperClient::new(&config.url, config.timeout)?),
        ScoringBackend::Mock => Arc::new(MockScorer::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_backend() {
        let http = from_config(&ScoringConfig::default()).unwrap();
        assert_eq!(http.name(), "Speechsuper");

        let mock = from_config(&ScoringConfig {
            backend: ScoringBackend::Mock,
            ..ScoringConfig::default()
        })
        .unwrap();
        assert_eq!(mock.name(), "MockScorer");
    }
}
