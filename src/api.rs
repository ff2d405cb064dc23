//! HTTP surface: admin back-office under `/api/admin`, dashboard routes under `/api`.

mod admin;
mod dto;
mod error;
mod extract;
mod input;
mod public;

use crate::chat::ChatService;
use crate::identity::IdentityResolver;
use crate::memory::ConversationMemory;
use crate::store::Store;
use axum::routing::get;
use axum::{Json, Router};
pub use error::ApiError;
pub use extract::{AdminCaller, ValidatedJson, ValidatedPath};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub chat: Arc<ChatService>,
    pub memory: Arc<dyn ConversationMemory>,
    pub identity: Arc<dyn IdentityResolver>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(admin::routes())
        .merge(public::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tutor-admin"
    }))
}
