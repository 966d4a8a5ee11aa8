//! Tutoring
//!
//! One model call per student response. Calls may overlap up to the
//! configured concurrency, but results are always yielded in input order.

use std::pin::pin;
use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider, PromptChain, PromptTemplate};
use futures::stream::{self, StreamExt};

use crate::config::TutorErrorPolicy;
use crate::error::{Result, Stage, TutorError};
use crate::model::{LessonPlan, PerformanceLog, PerformanceLogEntry, strip_reasoning};
use crate::prompts::TUTORING_TEMPLATE;

pub struct TutorAgent {
    chain: PromptChain,
    policy: TutorErrorPolicy,
    concurrency: usize,
}

impl TutorAgent {
    /// A concurrency of 0 is treated as 1
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        policy: TutorErrorPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            chain: PromptChain::new(
                provider,
                PromptTemplate::new(TUTORING_TEMPLATE),
                GenerationOptions::for_model(model),
            ),
            policy,
            concurrency: concurrency.max(1),
        }
    }

    pub const fn policy(&self) -> TutorErrorPolicy {
        self.policy
    }

    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Tutor every response against the plan.
    ///
    /// The returned log has exactly one entry per response, in input order.
    /// Under [`TutorErrorPolicy::FailFast`] the first failed call aborts the
    /// lesson; under [`TutorErrorPolicy::RecordAndContinue`] it becomes a
    /// failed entry.
    pub async fn conduct_lesson(
        &self,
        lesson_plan: &LessonPlan,
        responses: &[String],
    ) -> Result<PerformanceLog> {
        let plan = lesson_plan.text();

        let mut outcomes = pin!(
            stream::iter(responses.iter().enumerate())
                .map(|(idx, response)| async move {
                    let outcome = self
                        .chain
                        .invoke(&[("lesson_plan", plan), ("student_response", response.as_str())])
                        .await;
                    (idx, response, outcome)
                })
                .buffered(self.concurrency)
                .boxed()
        );

        let mut log = PerformanceLog::new();
        while let Some((idx, response, outcome)) = outcomes.next().await {
            match outcome {
                Ok(raw) => {
                    log.push(PerformanceLogEntry::new(response.as_str(), strip_reasoning(&raw)));
                }
                Err(e) => match self.policy {
                    TutorErrorPolicy::FailFast => {
                        return Err(TutorError::generation(Stage::Tutoring(idx), e));
                    }
                    TutorErrorPolicy::RecordAndContinue => {
                        tracing::warn!(response = idx + 1, error = %e, "Tutor call failed, continuing");
                        log.push(PerformanceLogEntry::failed(response.as_str(), e.to_string()));
                    }
                },
            }
        }

        Ok(log)
    }
}
