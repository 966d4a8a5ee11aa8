//! English tutor HTTP server
//!
//! Axum server exposing the tutoring pipeline (`/api/session`) and the
//! tool-using tutor assistant (`/api/chat`).

mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{LlmProvider, ToolRegistry};
use agent_runtime::OllamaProvider;
use english_tutor::{
    LanguageLearningSession, TutorConfig, scoring,
    tools::{ArithmeticTool, ScoreFeedbackTool, WebSearchTool},
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = TutorConfig::from_env()?;

    // Initialize LLM provider
    let provider: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::from_env());

    // Verify Ollama connection
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - sessions will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }
    tracing::info!(
        planner = %config.models.planner,
        tutor = %config.models.tutor,
        feedback = %config.models.feedback,
        policy = ?config.error_policy,
        concurrency = config.concurrency,
        "Tutoring pipeline configured"
    );

    let scorer = scoring::from_config(&config.scoring)?;
    tracing::info!(scorer = %scorer.name(), url = %config.scoring.url, "Competency scoring configured");

    // Initialize tools
    let mut tools = ToolRegistry::new();
    tools.register(ArithmeticTool);
    tools.register(ScoreFeedbackTool::new(scorer.clone()));
    match &config.tavily_api_key {
        Some(key) => tools.register(WebSearchTool::new(key.clone())?),
        None => tracing::warn!("⚠ TAVILY_API_KEY not set - web search disabled"),
    }

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let state = AppState {
        session: Arc::new(LanguageLearningSession::new(provider.clone(), scorer, &config)),
        provider,
        tools: Arc::new(tools),
        chat_model: config.models.chat.clone(),
    };

    let app = routes::router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 english tutor running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health       - Health check");
    tracing::info!("  GET  /api/models   - List available models");
    tracing::info!("  POST /api/session  - Run a tutoring session");
    tracing::info!("  POST /api/chat     - Ask the tutor assistant");

    axum::serve(listener, app).await?;

    Ok(())
}
