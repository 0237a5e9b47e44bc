//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, ServiceInfo};
use super::AppState;
use crate::runtime::TurnError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/start", post(start_conversation))
        .route("/chat", post(chat))
        .with_state(state)
}

// ============================================================
// Status
// ============================================================

async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "ok",
        service: "barista-agent",
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        sessions: state.barista.sessions().len().await,
    })
}

// ============================================================
// Conversation
// ============================================================

async fn start_conversation(
    State(state): State<AppState>,
) -> Result<Json<ChatResponse>, AppError> {
    let outcome = state.barista.start().await?;
    Ok(Json(ChatResponse {
        response: outcome.response,
        session_id: outcome.session_id,
        finished: outcome.finished,
    }))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let outcome = state.barista.chat(&req.session_id, &req.message).await?;
    Ok(Json(ChatResponse {
        response: outcome.response,
        session_id: req.session_id,
        finished: outcome.finished,
    }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    GatewayTimeout(String),
    Internal(String),
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        let message = e.user_message();
        match e {
            TurnError::EmptyMessage => AppError::BadRequest(message),
            TurnError::SessionNotFound(_) => AppError::NotFound(message),
            TurnError::OrderAlreadyFinished => AppError::Conflict(message),
            TurnError::InvalidToolCall(_)
            | TurnError::ToolLoopExceeded { .. }
            | TurnError::Model(_) => AppError::BadGateway(message),
            TurnError::ModelTimeout(_) => AppError::GatewayTimeout(message),
            TurnError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::menu::Menu;
    use crate::runtime::testing::{text_response, tool_response, MockLlmClient};
    use crate::runtime::{Barista, TurnConfig};
    use crate::session::SessionStore;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(llm: Arc<MockLlmClient>) -> Router {
        let barista = Barista::new(
            llm,
            Arc::new(Menu::standard()),
            Arc::new(SessionStore::new()),
            TurnConfig::default(),
        );
        create_router(AppState::new(Arc::new(barista)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let app = app(Arc::new(MockLlmClient::new()));

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "service": "barista-agent"}));

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "sessions": 0}));
    }

    #[tokio::test]
    async fn test_start_then_chat() {
        let llm = Arc::new(MockLlmClient::new());
        let app = app(llm.clone());

        llm.queue_response(text_response("Welcome in!"));
        let (status, body) = send(&app, post_empty("/start")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Welcome in!");
        assert_eq!(body["finished"], false);
        let session_id = body["session_id"].as_str().unwrap().to_string();

        llm.queue_response(tool_response(vec![("get_menu", json!({}))]));
        llm.queue_response(text_response("We have lattes and more."));
        let (status, body) = send(
            &app,
            post_json(
                "/chat",
                &json!({"message": "what do you have?", "session_id": session_id}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "We have lattes and more.");
        assert_eq!(body["session_id"], session_id.as_str());

        let (_, body) = send(&app, get("/health")).await;
        assert_eq!(body["sessions"], 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = app(Arc::new(MockLlmClient::new()));
        let (status, body) = send(
            &app,
            post_json("/chat", &json!({"message": "hi", "session_id": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let app = app(Arc::new(MockLlmClient::new()));
        let (status, body) = send(&app, post_json("/chat", &json!({"text": "hi"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_empty_message_is_400() {
        let llm = Arc::new(MockLlmClient::new());
        let app = app(llm.clone());
        llm.queue_response(text_response("Hi"));
        let (_, body) = send(&app, post_empty("/start")).await;

        let (status, _) = send(
            &app,
            post_json(
                "/chat",
                &json!({"message": "  ", "session_id": body["session_id"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_model_failure_is_502() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_error(LlmError::server_error("upstream exploded"));
        let app = app(llm);

        let (status, body) = send(&app, post_empty("/start")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body["error"].as_str().unwrap().contains("exploded"));

        let (_, body) = send(&app, get("/health")).await;
        assert_eq!(body["sessions"], 0);
    }

    #[tokio::test]
    async fn test_finished_session_is_409() {
        let llm = Arc::new(MockLlmClient::new());
        let app = app(llm.clone());

        llm.queue_response(text_response("Hi"));
        let (_, body) = send(&app, post_empty("/start")).await;
        let session_id = body["session_id"].clone();

        llm.queue_response(tool_response(vec![
            ("add_to_order", json!({"item": "Espresso"})),
            ("confirm_order", json!({})),
            ("place_order", json!({})),
        ]));
        llm.queue_response(text_response("All done, thanks!"));
        let (status, body) = send(
            &app,
            post_json(
                "/chat",
                &json!({"message": "one espresso, yes place it", "session_id": session_id}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["finished"], true);

        let (status, _) = send(
            &app,
            post_json("/chat", &json!({"message": "hello?", "session_id": session_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
