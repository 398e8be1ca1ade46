// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
//! HTTP transport
//!
//! Thin axum layer over the RAG service and message store. The streaming
//! endpoint relays the service's token stream as a chunked plain-text body;
//! client disconnects surface to the service as a dropped stream, so no
//! transport-specific probe is wired here.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use super::errors::ApiError;
use crate::container::Container;
use crate::rag::RagService;
use crate::storage::{MessageRecord, MessageStore, Role};
use crate::vector::VectorStore;

#[derive(Clone)]
pub struct AppState {
    service: Arc<RagService>,
    store: Arc<dyn MessageStore>,
    vector_store: Arc<dyn VectorStore>,
}

impl AppState {
    pub fn new(container: Container) -> Self {
        Self {
            service: container.service,
            store: container.store,
            vector_store: container.vector_store,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RagQuery {
    pub session_id: Uuid,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    vector_store: bool,
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    session_id: Uuid,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/sessions", post(create_session_handler))
        .route(
            "/api/v1/chat/:session_id",
            get(get_chat_handler)
                .post(post_message_handler)
                .delete(delete_chat_handler),
        )
        .route("/api/v1/rag/query", post(rag_query_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let vector_store = state.vector_store.health_check().await;
    Json(HealthResponse {
        status: "ok",
        vector_store,
    })
}

async fn create_session_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = state.store.create_session().await?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// All messages in the session, ordered by creation time
async fn get_chat_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<MessageRecord>>, ApiError> {
    let messages = state.store.list(session_id).await?;
    Ok(Json(messages))
}

async fn post_message_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(message): Json<MessageCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if message.content.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "message content must not be empty".to_string(),
        ));
    }
    let record = state
        .store
        .append(session_id, message.role, &message.content)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_chat_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.clear(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stream a retrieval-augmented answer as chunked plain text.
///
/// 5xx is only possible before the stream begins; once streaming, failures
/// arrive inside the body as fallback text.
async fn rag_query_handler(
    State(state): State<AppState>,
    Json(query): Json<RagQuery>,
) -> Response {
    let stream = state.service.stream(query.session_id, query.message, None);
    let body = Body::from_stream(stream.map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk))));

    (
        StatusCode::ACCEPTED,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
        .into_response()
}
