//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use agent_core::{
    provider::ModelInfo,
    reasoning::{Agent, AgentConfig},
};
use english_tutor::{SessionResult, StudentProfile, TutorError, prompts::CHAT_SYSTEM_PROMPT};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider_connected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub profile: StudentProfile,
    #[serde(default)]
    pub responses: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn tutor_error(err: &TutorError) -> ApiError {
    let (status, code) = match err {
        TutorError::InvalidProfile(_) => (StatusCode::BAD_REQUEST, "INVALID_PROFILE"),
        TutorError::Generation { .. } => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
        TutorError::Config(_) | TutorError::Template(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };
    tracing::debug!(status = status.as_u16(), code, "Session error mapped");
    api_error(status, code, err.user_message())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        provider_connected,
    })
}

/// Models known to the provider
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let models = state.provider.list_models().await.map_err(|e| {
        tracing::warn!(error = %e, "Listing models failed");
        api_error(StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE", e.user_message())
    })?;

    Ok(Json(ModelsResponse { models }))
}

/// Run a full tutoring session
pub async fn session_handler(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<SessionResult>, ApiError> {
    let result = state
        .session
        .run_session(&payload.profile, &payload.responses)
        .await
        .map_err(|e| tutor_error(&e))?;

    Ok(Json(result))
}

/// Single chat turn with the tool-using tutor assistant
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "EMPTY_MESSAGE",
            "Message must not be empty",
        ));
    }

    let mut config = AgentConfig {
        system_prompt: CHAT_SYSTEM_PROMPT.into(),
        ..AgentConfig::default()
    };
    config.generation.model.clone_from(&state.chat_model);

    let agent = Agent::new(state.provider.clone(), state.tools.clone(), config);

    let message = agent.ask(&payload.message).await.map_err(|e| {
        tracing::error!(error = %e, "Agent error");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR", e.user_message())
    })?;

    Ok(Json(ChatResponse {
        message,
        model: state.chat_model,
    }))
}
