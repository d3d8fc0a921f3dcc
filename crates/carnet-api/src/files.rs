use axum::{
    Extension, Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;
use tracing::error;
use uuid::Uuid;

use carnet_messaging::store;
use carnet_types::Claims;
use carnet_types::api::UploadResponse;

use crate::error::ApiError;
use crate::storage::Storage;
use crate::{AppState, run_blocking};

/// 50 MB upload limit for attachments.
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// POST /messaging/upload — accepts one multipart `file` field, stores the
/// blob under a fresh name and returns the reference the client then puts
/// into its send-message request.
pub async fn upload(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::bad_request("file field needs a filename"))?;
        let declared_type = field
            .content_type()
            .map(str::to_owned)
            .unwrap_or_else(|| "application/octet-stream".into());

        let bytes = field.bytes().await.map_err(|e| {
            error!("Failed to read upload body: {}", e);
            ApiError::payload_too_large()
        })?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("uploaded file is empty"));
        }
        if bytes.len() > MAX_FILE_SIZE {
            return Err(ApiError::payload_too_large());
        }

        let stored_name = Storage::stored_name(&file_name);
        let path = state.storage.save(&stored_name, &bytes).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                file_name,
                stored_name,
                file_path: path.display().to_string(),
                file_type: declared_type,
                file_size: bytes.len() as u64,
            }),
        ));
    }

    Err(ApiError::bad_request("multipart body needs a `file` field"))
}

/// GET /messaging/download/{message_id} — stream a message's attachment.
///
/// The owning conversation is re-derived from the message row and the access
/// policy re-runs before a single byte leaves the disk; the client never
/// picks the path.
pub async fn download(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let message =
        run_blocking(move || store::readable_message(&db, &caller, &message_id.to_string()))
            .await?;

    let reference = message
        .file_path
        .as_deref()
        .ok_or_else(|| ApiError::not_found(format!("message {message_id} has no attachment")))?;
    let path = state
        .storage
        .resolve(reference)
        .ok_or_else(|| ApiError::not_found(format!("message {message_id} has no attachment")))?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        error!("Failed to open attachment {}: {}", path.display(), e);
        ApiError::not_found(format!("attachment for message {message_id} is gone"))
    })?;

    // MIME from the stored extension, not the client-declared type.
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let download_name = message.file_name.unwrap_or_else(|| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".into())
    });

    let headers = [
        (header::CONTENT_TYPE, mime.essence_str().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name.replace('"', "")),
        ),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))))
}
