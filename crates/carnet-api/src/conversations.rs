use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use carnet_messaging::{admin, resolver};
use carnet_types::Claims;
use carnet_types::api::{
    ConversationResponse, CreateOrGetConversationRequest, CreateOrGetConversationResponse,
    UpdateConversationRequest,
};

use crate::error::ApiError;
use crate::{AppState, convert, run_blocking};

/// GET /messaging/conversations — everything the caller is entitled to see,
/// materializing missing conversations along the way.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let entries = run_blocking(move || resolver::list_conversations(&db, &caller)).await?;
    let conversations: Vec<ConversationResponse> = entries
        .into_iter()
        .map(convert::conversation_response)
        .collect();
    Ok(Json(conversations))
}

/// GET /messaging/conversations/{id} — access-gated, with the same preview
/// annotation as the listing.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let entry =
        run_blocking(move || resolver::get_conversation(&db, &caller, &id.to_string())).await?;
    Ok(Json(convert::conversation_response(entry)))
}

/// POST /messaging/conversations/create-or-get — find-or-create the direct
/// conversation with a chosen recipient.
pub async fn create_or_get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrGetConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let (entry, is_new) = run_blocking(move || {
        let (row, is_new) =
            resolver::create_or_get_direct(&db, &caller, &req.recipient_id.to_string())?;
        Ok((resolver::annotate(&db, row), is_new))
    })
    .await?;

    let status = if is_new { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(CreateOrGetConversationResponse {
            conversation: convert::conversation_response(entry),
            is_new,
        }),
    ))
}

/// PATCH /messaging/conversations/{id} — admin rename.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let entry = run_blocking(move || {
        let row =
            admin::update_conversation(&db, &caller, &id.to_string(), req.title.as_deref())?;
        Ok(resolver::annotate(&db, row))
    })
    .await?;
    Ok(Json(convert::conversation_response(entry)))
}

/// DELETE /messaging/conversations/{id} — admin delete, cascades to the
/// conversation's messages.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    run_blocking(move || admin::delete_conversation(&db, &caller, &id.to_string())).await?;
    Ok(StatusCode::NO_CONTENT)
}
