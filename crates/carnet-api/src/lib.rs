//! HTTP surface for the messaging engine.

pub mod conversations;
mod convert;
pub mod error;
pub mod files;
pub mod messages;
pub mod middleware;
pub mod recipients;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use carnet_db::Database;
use carnet_messaging::MessagingError;

pub use error::ApiError;
pub use storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub storage: Storage,
    pub jwt_secret: String,
}

/// Assemble the application router. Everything under /messaging sits behind
/// the auth middleware; /health stays public.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/messaging/conversations", get(conversations::list))
        .route(
            "/messaging/conversations/create-or-get",
            post(conversations::create_or_get),
        )
        .route(
            "/messaging/conversations/{id}",
            get(conversations::get_one)
                .patch(conversations::update)
                .delete(conversations::remove),
        )
        .route(
            "/messaging/conversations/{id}/messages",
            get(messages::list),
        )
        .route(
            "/messaging/conversations/{id}/messages/search",
            get(messages::search),
        )
        .route("/messaging/messages", post(messages::send))
        .route(
            "/messaging/messages/{id}",
            patch(messages::update).delete(messages::remove),
        )
        .route("/messaging/messages/{id}/read", patch(messages::mark_read))
        .route(
            "/messaging/upload",
            post(files::upload).layer(DefaultBodyLimit::max(files::MAX_FILE_SIZE + 64 * 1024)),
        )
        .route("/messaging/download/{message_id}", get(files::download))
        .route("/messaging/recipients", get(recipients::list))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run a blocking messaging-engine call off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, MessagingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}
