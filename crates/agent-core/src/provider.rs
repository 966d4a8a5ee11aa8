//! LLM Provider Strategy Pattern
//!
//! Every agent talks to its model through [`LlmProvider`], so a local Ollama
//! model, a hosted API or the scripted [`crate::mock::MockProvider`] can be
//! swapped in without touching agent logic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OllamaProvider::from_env();
//! let options = GenerationOptions::for_model("llama3.2:3b");
//! let text = provider.invoke("Correct this sentence: I goes home.", &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::Message;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Configuration for a single generation request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "llama3.2:3b", "deepseek-r1:8b")
    pub model: String,

    /// System prompt sent ahead of the messages, if any
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::for_model(DEFAULT_MODEL)
    }
}

impl GenerationOptions {
    /// Options for the given model; sampling is left to the backend
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if the backend reports them)
    pub usage: Option<TokenUsage>,

    pub finish_reason: Option<FinishReason>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    Error,
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub models: Vec<ModelInfo>,
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// Agents work exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name and the models it currently serves
    async fn info(&self) -> Result<ProviderInfo>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Send one user prompt and return the completion text.
    ///
    /// An empty (whitespace-only) completion is an error: downstream agents
    /// never receive a blank lesson plan or blank feedback.
    async fn invoke(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &options.system_prompt {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(prompt));

        let completion = self.complete(&messages, options).await?;
        if completion.content.trim().is_empty() {
            return Err(AgentError::EmptyCompletion(options.model.clone()));
        }
        Ok(completion.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.model, DEFAULT_MODEL);
        assert!(opts.system_prompt.is_none());
    }

    #[test]
    fn test_generation_options_carry_no_sampling_settings() {
        let value = serde_json::to_value(GenerationOptions::for_model("tutor")).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["model", "system_prompt"]);

        let parsed: GenerationOptions = serde_json::from_str(r#"{"model": "planner"}"#).unwrap();
        assert_eq!(parsed.model, "planner");
    }

    #[tokio::test]
    async fn test_invoke_sends_system_prompt_first() {
        let provider = MockProvider::echo();
        let mut options = GenerationOptions::for_model("tutor");
        options.system_prompt = Some("Be kind.".into());

        let text = provider.invoke("Hello", &options).await.unwrap();
        assert_eq!(text, "echo: Hello");

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
        assert_eq!(calls[0][0].content, "Be kind.");
    }

    #[tokio::test]
    async fn test_invoke_rejects_blank_completion() {
        let provider = MockProvider::scripted(["   "]);
        let err = provider
            .invoke("Hello", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::EmptyCompletion(_)));
    }
}
