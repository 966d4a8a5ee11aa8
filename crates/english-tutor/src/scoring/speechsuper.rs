//! HTTP client for a Speechsuper-style scoring endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

use super::CompetencyScorer;
use crate::error::{Result, TutorError};
use crate::model::{CompetencyScores, ScoringApiError};

/// Error text reported for any non-200 answer
pub const SCORING_API_ERROR: &str = "Speechsuper API error";

#[derive(Serialize)]
struct ScoreRequest<'a> {
    performance_summary: &'a str,
}

/// Posts `{"performance_summary": …}` and passes a 200 body through as the
/// scores. The whole request, body included, is bounded by `timeout`.
pub struct SpeechsuperClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl SpeechsuperClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TutorError::Config(format!("scoring HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!(
                "Speechsuper API request timed out after {}ms: {err}",
                self.timeout.as_millis()
            )
        } else {
            err.to_string()
        }
    }
}

#[async_trait]
impl CompetencyScorer for SpeechsuperClient {
    async fn score(&self, performance_summary: &str) -> CompetencyScores {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest {
                performance_summary,
            })
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Scoring request failed");
                return CompetencyScores::Failed(ScoringApiError::new(self.describe(&e)));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url = %self.url, status = status.as_u16(), "Scoring API returned an error status");
            return CompetencyScores::Failed(ScoringApiError::with_status(
                SCORING_API_ERROR,
                status.as_u16(),
            ));
        }

        match response.json::<serde_json::Value>().await {
            Ok(scores) => CompetencyScores::Scores(scores),
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Scoring API returned an unreadable body");
                CompetencyScores::Failed(ScoringApiError::new(self.describe(&e)))
            }
        }
    }

    fn name(&self) -> &str {
        "Speechsuper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> SpeechsuperClient {
        SpeechsuperClient::new(format!("{}/analyze", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_ok_body_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_json(json!({"performance_summary": "Response: hi\nFeedback: ok"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pronunciation": 81})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let scores = client.score("Response: hi\nFeedback: ok").await;

        assert_eq!(scores, CompetencyScores::Scores(json!({"pronunciation": 81})));
    }

    #[tokio::test]
    async fn test_server_error_becomes_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let scores = client.score("summary").await;

        let error = scores.error().unwrap();
        assert_eq!(error.error, SCORING_API_ERROR);
        assert_eq!(error.status_code, Some(500));
    }

    #[tokio::test]
    async fn test_non_200_success_is_still_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"queued": true})))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        assert_eq!(client.score("summary").await.status_code(), Some(202));
    }

    #[tokio::test]
    async fn test_timeout_is_bounded_and_described() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"pronunciation": 81}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        let started = std::time::Instant::now();
        let scores = client.score("summary").await;

        assert!(started.elapsed() < Duration::from_secs(2));
        let error = scores.error().unwrap();
        assert!(error.error.contains("timed out"), "{}", error.error);
        assert_eq!(error.status_code, None);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Port 9 (discard) is closed on test machines
        let client = SpeechsuperClient::new("http://127.0.0.1:9/analyze", Duration::from_secs(1)).unwrap();
        let scores = client.score("summary").await;
        assert!(scores.is_error());
        assert_eq!(scores.status_code(), None);
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let scores = client.score("summary").await;
        assert!(scores.is_error());
    }
}
