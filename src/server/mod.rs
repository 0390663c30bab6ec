//! HTTP surface: public JSON reads and Basic-auth protected admin writes.

mod auth;
mod error;
mod handlers;

pub use auth::AdminAuth;
pub use error::{AppError, AppErrorKind, AppResult, Localize};

use crate::storage::FileStorage;
use crate::store::ContentStore;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Admin credentials checked on every `/admin` request.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub user: String,
    pub password: String,
}

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub storage: Arc<dyn FileStorage>,
    pub admin: Arc<AdminCredentials>,
    /// Per-file upload cap, also used to size the gallery body limit.
    pub max_upload_bytes: usize,
    /// Name of the persistence backend, reported by `/health`.
    pub backend: &'static str,
}

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Files accepted in one gallery request.
const MAX_FILES_PER_REQUEST: usize = 20;

pub fn router(state: AppState) -> Router {
    let gallery_limit = state
        .max_upload_bytes
        .saturating_mul(MAX_FILES_PER_REQUEST);

    let admin = Router::new()
        .route("/admin/pages/:slug", post(handlers::update_page))
        .route("/admin/:kind", post(handlers::create_item))
        .route("/admin/:kind/:id", post(handlers::update_item))
        .route("/admin/:kind/:id/delete", post(handlers::delete_item))
        .route(
            "/admin/:kind/:id/gallery",
            post(handlers::edit_gallery).layer(DefaultBodyLimit::max(gallery_limit)),
        )
        .route("/admin/:kind/:id/variants", get(handlers::list_variants));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/menu", get(handlers::menu))
        .route("/api/:kind", get(handlers::list_items))
        .route("/api/:kind/:id", get(handlers::get_item))
        .route("/api/:kind/slug/:slug", get(handlers::get_by_slug))
        .merge(admin)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
