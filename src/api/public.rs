//! Routes for the dashboard: public template listing plus signed-in history and chat.

use super::dto::{AiOutputDto, ChatReply, MessageDto, PublicTemplateDto};
use super::{ApiError, AppState, ValidatedJson, ValidatedPath};
use crate::identity::Caller;
use crate::store::ProfileSync;
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use validator::Validate;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/templates", get(list_templates))
        .route("/api/templates/{slug}", get(get_template))
        .route("/api/ai-outputs", post(record_ai_output))
        .route("/api/history", get(history))
        .route("/api/chat/{tutor_id}", post(send_chat).get(conversation))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AiOutputCreate {
    #[validate(length(min = 1, message = "templateSlug is required"))]
    pub template_slug: String,
    #[serde(default)]
    pub form_data: Value,
    #[serde(default)]
    pub ai_response: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Mirrors the caller's gateway profile so admin listings can show names and emails.
async fn sync_caller(state: &AppState, caller: &Caller) {
    let Some(email) = caller.email.clone() else {
        return;
    };
    let profile = ProfileSync {
        clerk_id: caller.id.clone(),
        email,
        first_name: caller.first_name.clone(),
        ..Default::default()
    };
    if let Err(e) = state.store.sync_profile(profile).await {
        warn!("Failed to sync profile for {}: {:#}", caller.id, e);
    }
}

async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicTemplateDto>>, ApiError> {
    let templates = state.store.list_active_templates().await?;
    Ok(Json(
        templates.into_iter().map(PublicTemplateDto::from).collect(),
    ))
}

async fn get_template(
    State(state): State<AppState>,
    ValidatedPath(slug): ValidatedPath<String>,
) -> Result<Json<PublicTemplateDto>, ApiError> {
    let template = state
        .store
        .find_template_by_slug(&slug)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| ApiError::not_found("Template"))?;
    Ok(Json(template.into()))
}

async fn record_ai_output(
    caller: Caller,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<AiOutputCreate>,
) -> Result<(StatusCode, Json<AiOutputDto>), ApiError> {
    sync_caller(&state, &caller).await;

    let form_data = match body.form_data {
        Value::String(text) => text,
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    };
    let output = state
        .store
        .record_ai_output(&body.template_slug, &form_data, &body.ai_response, caller.label())
        .await?;
    Ok((StatusCode::CREATED, Json(output.into())))
}

async fn history(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<AiOutputDto>>, ApiError> {
    sync_caller(&state, &caller).await;
    let outputs = state.store.list_ai_outputs_by_creator(caller.label()).await?;
    Ok(Json(outputs.into_iter().map(AiOutputDto::from).collect()))
}

/// In test mode the body is never read.
async fn send_chat(
    caller: Caller,
    State(state): State<AppState>,
    ValidatedPath(tutor_id): ValidatedPath<String>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<ChatReply>, ApiError> {
    if state.chat.test_mode() {
        let response = state.chat.test_exchange(&tutor_id, &caller.id).await?;
        return Ok(Json(ChatReply { response }));
    }

    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON: {}", e)))?;
    if request.prompt.trim().is_empty() {
        return Err(ApiError::Validation("Prompt is required".into()));
    }

    let response = state
        .chat
        .respond(uri.path(), &tutor_id, &caller.id, &request.prompt)
        .await?;
    Ok(Json(ChatReply { response }))
}

/// The caller's own message log with one tutor, oldest first.
async fn conversation(
    caller: Caller,
    State(state): State<AppState>,
    ValidatedPath(tutor_id): ValidatedPath<String>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    if state.store.find_tutor(&tutor_id).await?.is_none() {
        return Err(ApiError::not_found("Tutor"));
    }
    let messages = state.store.list_conversation(&tutor_id, &caller.id).await?;
    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}
