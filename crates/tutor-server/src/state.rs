//! Application State

use std::sync::Arc;

use agent_core::{LlmProvider, ToolRegistry};
use english_tutor::LanguageLearningSession;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (Ollama, or the mock in tests)
    pub provider: Arc<dyn LlmProvider>,

    /// Tools available to the chat agent
    pub tools: Arc<ToolRegistry>,

    /// Tutoring pipeline; stateless, shared by all requests
    pub session: Arc<LanguageLearningSession>,

    /// Model used by `/api/chat`
    pub chat_model: String,
}
