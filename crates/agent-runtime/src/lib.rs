//! # agent-runtime
//!
//! Model backends for the tutoring agents.
//!
//! ## Providers
//!
//! - **Ollama** (default): local inference via an Ollama server
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::OllamaProvider;
//!
//! let provider = Arc::new(OllamaProvider::from_env());
//! let session = LanguageLearningSession::new(provider, scorer, &config);
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

pub use agent_core::{AgentError, LlmProvider, Result};
