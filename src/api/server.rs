//! API Server module
//!
//! This module exposes the command bridge over HTTP.

use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bridge::Bridge;
use crate::models::{find_duplicate_id, ChatRequest, ErrorResponse};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 3000).into(),
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Builds the application router around a bridge
pub fn app(bridge: Bridge) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/openai", post(chat_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(bridge)
}

/// Starts the API server
pub async fn serve(bridge: Bridge, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!(
        provider = bridge.provider_name(),
        model = bridge.model(),
        "Starting server on {}",
        config.address
    );
    let listener = TcpListener::bind(config.address).await?;
    axum::serve(listener, app(bridge)).await?;

    Ok(())
}

async fn chat_handler(
    State(bridge): State<Bridge>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("rejecting chat request: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if let Some(id) = find_duplicate_id(&request.current_todos) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("currentTodos contains duplicate id {}", id),
        );
    }

    match bridge
        .resolve(&request.messages, &request.current_todos)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("command failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn health_handler(State(bridge): State<Bridge>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "provider": bridge.provider_name(),
        "model": bridge.model(),
    }))
}
