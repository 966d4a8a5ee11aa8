//! Router

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{chat_handler, health_check, list_models, session_handler};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        // Tutoring
        .route("/api/session", post(session_handler))
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use agent_core::{AgentError, LlmProvider, ToolRegistry, mock::MockProvider, tool::ArithmeticTool};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use english_tutor::{LanguageLearningSession, MockScorer, SessionResult, TutorConfig};
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;
    use tracing_subscriber::layer::SubscriberExt;

    use crate::handlers::{ChatResponse, ErrorResponse, HealthResponse, ModelsResponse};

    fn state(provider: MockProvider) -> AppState {
        let provider: Arc<dyn LlmProvider> = Arc::new(provider);
        let config = TutorConfig::with_defaults().unwrap();
        let mut tools = ToolRegistry::new();
        tools.register(ArithmeticTool);

        AppState {
            session: Arc::new(LanguageLearningSession::new(
                provider.clone(),
                Arc::new(MockScorer::new()),
                &config,
            )),
            provider,
            tools: Arc::new(tools),
            chat_model: config.models.chat,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(state(MockProvider::echo()));
        let (status, body) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = parse(&body);
        assert_eq!(health.status, "healthy");
        assert!(health.provider_connected);
    }

    #[tokio::test]
    async fn test_models() {
        let app = router(state(MockProvider::echo()));
        let (status, body) = send(app, Request::get("/api/models").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let models: ModelsResponse = parse(&body);
        assert_eq!(models.models[0].id, "mock");
    }

    #[tokio::test]
    async fn test_session_runs_pipeline() {
        let app = router(state(MockProvider::echo()));
        let request = post_json(
            "/api/session",
            &serde_json::json!({
                "profile": {"level": "Intermediate", "progress": 50},
                "responses": ["I like tea.", "She go to school."]
            }),
        );

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);

        let result: SessionResult = parse(&body);
        assert_eq!(result.performance_logs.len(), 2);
        assert_eq!(
            result.performance_logs.entries()[1].student_response,
            "She go to school."
        );
        assert!(result.updated_profile.contains_key("strengths"));
    }

    #[tokio::test]
    async fn test_empty_profile_is_bad_request() {
        let app = router(state(MockProvider::echo()));
        let request = post_json("/api/session", &serde_json::json!({"profile": {}, "responses": []}));

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse::<ErrorResponse>(&body).code, "INVALID_PROFILE");
    }

    /// Counts ERROR events seen while it is the default subscriber
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_session_failure_is_logged_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(errors.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = router(state(MockProvider::echo()));
        let request = post_json("/api/session", &serde_json::json!({"profile": {}, "responses": []}));

        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_failure_is_bad_gateway() {
        let app = router(state(MockProvider::failing("connection refused")));
        let request = post_json(
            "/api/session",
            &serde_json::json!({"profile": {"level": "Beginner"}, "responses": ["Hi"]}),
        );

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(parse::<ErrorResponse>(&body).code, "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_chat_uses_tools() {
        let provider = MockProvider::from_fn(|idx, _| match idx {
            0 => Ok(r#"{"tool": "arithmetic", "arguments": {"a": 40, "b": 2, "operation": "add"}}"#.into()),
            1 => Ok("Your total score is 42.".into()),
            _ => Err(AgentError::Provider("unexpected call".into())),
        });
        let app = router(state(provider));

        let (status, body) = send(
            app,
            post_json("/api/chat", &serde_json::json!({"message": "Add 40 and 2"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let chat: ChatResponse = parse(&body);
        assert_eq!(chat.message, "Your total score is 42.");
        assert_eq!(chat.model, "llama3.2:3b");
    }

    #[tokio::test]
    async fn test_empty_chat_message() {
        let app = router(state(MockProvider::echo()));
        let (status, _) = send(app, post_json("/api/chat", &serde_json::json!({"message": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
