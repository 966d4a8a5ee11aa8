//! Mock LLM Provider
//!
//! Scripted provider for tests, demos and running the service without a
//! model backend. Every call is recorded so tests can inspect the prompts an
//! agent actually sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::{Message, Role};
use crate::provider::{
    Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
};

type Responder = dyn Fn(usize, &[Message]) -> Result<String> + Send + Sync;
type DelayFn = dyn Fn(&[Message]) -> Duration + Send + Sync;

/// Provider that answers from a closure instead of a model
pub struct MockProvider {
    responder: Arc<Responder>,
    delay: Option<Arc<DelayFn>>,
    calls: Mutex<Vec<Vec<Message>>>,
    counter: AtomicUsize,
}

impl MockProvider {
    /// Answer every call with the given closure.
    ///
    /// The closure receives the zero-based call index and the messages.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(usize, &[Message]) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: None,
            calls: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    /// Reply `echo: <last user message>`
    pub fn echo() -> Self {
        Self::from_fn(|_, messages| {
            let last = messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map_or("", |m| m.content.as_str());
            Ok(format!("echo: {last}"))
        })
    }

    /// Return the scripted replies in order, then fail once exhausted
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        Self::from_fn(move |idx, _| {
            replies
                .get(idx)
                .cloned()
                .ok_or_else(|| AgentError::Provider(format!("no scripted reply for call {idx}")))
        })
    }

    /// Fail every call with a provider error
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_, _| Err(AgentError::ProviderUnavailable(message.clone())))
    }

    /// Sleep before answering; the delay is computed from the messages
    #[must_use]
    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&[Message]) -> Duration + Send + Sync + 'static,
    {
        self.delay = Some(Arc::new(delay));
        self
    }

    /// Messages of every call made so far, in call order
    pub async fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().await.clone()
    }

    pub fn call_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Mock".into(),
            models: self.list_models().await?,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let idx = self.counter.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().await.push(messages.to_vec());

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(messages)).await;
        }

        let content = (self.responder)(idx, messages)?;
        Ok(Completion {
            content,
            model: options.model.clone(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "mock".into(),
            name: "mock".into(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let provider = MockProvider::scripted(["first", "second"]);
        let opts = GenerationOptions::default();

        assert_eq!(provider.invoke("a", &opts).await.unwrap(), "first");
        assert_eq!(provider.invoke("b", &opts).await.unwrap(), "second");
        assert!(provider.invoke("c", &opts).await.is_err());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_provider() {
        let provider = MockProvider::failing("offline");
        let err = provider
            .invoke("a", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
