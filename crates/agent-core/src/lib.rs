//! # agent-core
//!
//! Provider-agnostic building blocks for the tutoring agents.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Role agent (planner / tutor / feedback)                     │
//! │  ┌────────────────┐      ┌──────────────────────────────┐    │
//! │  │ PromptTemplate │──────│ LlmProvider (Strategy)       │    │
//! │  └────────────────┘      └──────────────────────────────┘    │
//! │                 PromptChain                                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Agent (tool loop) ── ToolRegistry ── LlmProvider            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets Ollama, a hosted API or the scripted
//! [`mock::MockProvider`] back any agent without changing agent logic.

pub mod error;
pub mod message;
pub mod mock;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use prompt::{PromptChain, PromptTemplate};
pub use provider::{GenerationOptions, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
