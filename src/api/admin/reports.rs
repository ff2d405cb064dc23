use crate::api::dto::{ActivityDto, AiOutputDto, MessageWithTutorDto};
use crate::api::{AdminCaller, ApiError, AppState};
use crate::store::{Analytics, Stats};
use axum::Json;
use axum::extract::State;

const RECENT_LIMIT: u64 = 100;
const ACTIVITY_LIMIT: u64 = 10;

pub async fn recent_messages(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageWithTutorDto>>, ApiError> {
    let messages = state.store.list_recent_messages(RECENT_LIMIT).await?;
    Ok(Json(
        messages.into_iter().map(MessageWithTutorDto::from).collect(),
    ))
}

pub async fn recent_ai_outputs(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<AiOutputDto>>, ApiError> {
    let outputs = state.store.list_recent_ai_outputs(RECENT_LIMIT).await?;
    Ok(Json(outputs.into_iter().map(AiOutputDto::from).collect()))
}

pub async fn stats(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.store.stats().await?))
}

pub async fn analytics(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Analytics>, ApiError> {
    Ok(Json(state.store.analytics().await?))
}

pub async fn recent_activity(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityDto>>, ApiError> {
    let outputs = state.store.list_recent_ai_outputs(ACTIVITY_LIMIT).await?;
    Ok(Json(outputs.into_iter().map(ActivityDto::from).collect()))
}
