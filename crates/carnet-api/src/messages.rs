use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use carnet_messaging::store::{self, NewMessage};
use carnet_types::Claims;
use carnet_types::api::{MessageResponse, SendMessageRequest, UpdateMessageRequest};

use crate::error::ApiError;
use crate::{AppState, convert, run_blocking};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// GET /messaging/conversations/{id}/messages — full log, oldest first.
pub async fn list(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let rows = run_blocking(move || {
        store::conversation_messages(&db, &caller, &conversation_id.to_string())
    })
    .await?;
    let messages: Vec<MessageResponse> = rows.into_iter().map(convert::message_response).collect();
    Ok(Json(messages))
}

/// GET /messaging/conversations/{id}/messages/search?q= — substring match
/// within one conversation, oldest first.
pub async fn search(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let rows = run_blocking(move || {
        store::search_messages(&db, &caller, &conversation_id.to_string(), &query.q)
    })
    .await?;
    let messages: Vec<MessageResponse> = rows.into_iter().map(convert::message_response).collect();
    Ok(Json(messages))
}

/// POST /messaging/messages — append to a conversation the sender can access.
pub async fn send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let sender = claims.sub.to_string();

    let row = run_blocking(move || {
        store::send_message(
            &db,
            &sender,
            NewMessage {
                conversation_id: req.conversation_id.to_string(),
                content: req.content,
                kind: req.kind,
                file_path: req.file_path,
                file_name: req.file_name,
                mime_type: req.mime_type,
            },
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(convert::message_response(row))))
}

/// PATCH /messaging/messages/{id} — owner-or-admin content edit.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let row = run_blocking(move || {
        store::update_message(&db, &caller, claims.role, &id.to_string(), &req.content)
    })
    .await?;
    Ok(Json(convert::message_response(row)))
}

/// DELETE /messaging/messages/{id} — owner-or-admin hard delete.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    run_blocking(move || store::delete_message(&db, &caller, claims.role, &id.to_string())).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /messaging/messages/{id}/read — flip the read flag.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let row = run_blocking(move || store::mark_read(&db, &caller, &id.to_string())).await?;
    Ok(Json(convert::message_response(row)))
}
