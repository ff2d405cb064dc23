use crate::api::dto::{Success, TutorDto, TutorWithCategoryDto};
use crate::api::input::{present, trimmed, trimmed_opt};
use crate::api::{AdminCaller, ApiError, AppState, ValidatedJson, ValidatedPath};
use crate::chat::tutor_display_name;
use crate::memory::tutor_namespace;
use crate::store::{NewTutor, TutorChanges};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TutorCreate {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Instructions are required"))]
    pub instructions: String,
    #[serde(default)]
    pub seed: String,
    #[serde(default)]
    pub src: String,
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TutorUpdate {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct KnowledgeCreate {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// Empty or missing category ids mean "no category".
fn category_ref(id: Option<String>) -> Option<String> {
    id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

async fn ensure_category(state: &AppState, category_id: Option<&str>) -> Result<(), ApiError> {
    if let Some(id) = category_id
        && state.store.find_category(id).await?.is_none()
    {
        return Err(ApiError::Validation("Unknown categoryId".into()));
    }
    Ok(())
}

pub async fn list_tutors(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<TutorWithCategoryDto>>, ApiError> {
    let tutors = state.store.list_tutors().await?;
    Ok(Json(
        tutors.into_iter().map(TutorWithCategoryDto::from).collect(),
    ))
}

pub async fn create_tutor(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<TutorCreate>,
) -> Result<(StatusCode, Json<TutorDto>), ApiError> {
    let category_id = category_ref(body.category_id);
    ensure_category(&state, category_id.as_deref()).await?;

    let tutor = state
        .store
        .create_tutor(NewTutor {
            user_name: admin.first_name.clone().unwrap_or_else(|| admin.label().to_string()),
            user_id: admin.id,
            src: body.src,
            name: body.name,
            description: body.description,
            instructions: body.instructions,
            seed: body.seed,
            category_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(tutor.into())))
}

pub async fn get_tutor(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(tutor_id): ValidatedPath<String>,
) -> Result<Json<TutorWithCategoryDto>, ApiError> {
    let tutor = state
        .store
        .find_tutor_with_category(&tutor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tutor"))?;
    Ok(Json(tutor.into()))
}

pub async fn update_tutor(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(tutor_id): ValidatedPath<String>,
    ValidatedJson(body): ValidatedJson<TutorUpdate>,
) -> Result<Json<TutorDto>, ApiError> {
    let category_id = body.category_id.map(category_ref);
    ensure_category(&state, category_id.as_ref().and_then(|c| c.as_deref())).await?;

    let changes = TutorChanges {
        name: body.name,
        description: body.description,
        category_id,
    };
    let tutor = state
        .store
        .update_tutor(&tutor_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Tutor"))?;
    info!("{} updated tutor {}", admin.id, tutor_id);
    Ok(Json(tutor.into()))
}

pub async fn delete_tutor(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(tutor_id): ValidatedPath<String>,
) -> Result<Json<Success>, ApiError> {
    if !state.store.delete_tutor(&tutor_id).await? {
        return Err(ApiError::not_found("Tutor"));
    }
    info!("{} deleted tutor {}", admin.id, tutor_id);
    Ok(Json(Success::ok()))
}

/// Embeds a knowledge snippet into the tutor's search namespace.
pub async fn add_knowledge(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(tutor_id): ValidatedPath<String>,
    ValidatedJson(body): ValidatedJson<KnowledgeCreate>,
) -> Result<(StatusCode, Json<Success>), ApiError> {
    let tutor = state
        .store
        .find_tutor(&tutor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tutor"))?;

    let namespace = tutor_namespace(tutor_display_name(&tutor));
    state.memory.add_document(&namespace, &body.content).await?;
    info!("{} added knowledge to {}", admin.id, namespace);
    Ok((StatusCode::CREATED, Json(Success::ok())))
}
