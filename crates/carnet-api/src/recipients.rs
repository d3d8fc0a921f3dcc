use axum::{Extension, Json, extract::State, response::IntoResponse};

use carnet_messaging::resolver;
use carnet_types::Claims;
use carnet_types::api::UserResponse;

use crate::error::ApiError;
use crate::{AppState, convert, run_blocking};

/// GET /messaging/recipients — who the caller may open a direct
/// conversation with.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let caller = claims.sub.to_string();

    let rows = run_blocking(move || resolver::list_recipients(&db, &caller)).await?;
    let recipients: Vec<UserResponse> = rows.into_iter().map(convert::user_response).collect();
    Ok(Json(recipients))
}
