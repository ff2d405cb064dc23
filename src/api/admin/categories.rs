use crate::api::dto::{CategoryDetailDto, CategoryDto, Success};
use crate::api::input::trimmed;
use crate::api::{AdminCaller, ApiError, AppState, ValidatedJson, ValidatedPath};
use crate::store::CategoryDeletion;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryBody {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
}

pub async fn list_categories(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = state.store.list_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

pub async fn create_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CategoryBody>,
) -> Result<(StatusCode, Json<CategoryDto>), ApiError> {
    let category = state.store.create_category(&body.name).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn get_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(category_id): ValidatedPath<String>,
) -> Result<Json<CategoryDetailDto>, ApiError> {
    let category = state
        .store
        .find_category(&category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;
    let tutors_count = state.store.count_tutors_in_category(&category_id).await?;
    Ok(Json(CategoryDetailDto {
        category: category.into(),
        tutors_count,
    }))
}

pub async fn rename_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(category_id): ValidatedPath<String>,
    ValidatedJson(body): ValidatedJson<CategoryBody>,
) -> Result<Json<CategoryDto>, ApiError> {
    let category = state
        .store
        .rename_category(&category_id, &body.name)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;
    Ok(Json(category.into()))
}

pub async fn delete_category(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(category_id): ValidatedPath<String>,
) -> Result<Json<Success>, ApiError> {
    match state.store.delete_category(&category_id).await? {
        CategoryDeletion::Deleted => {
            info!("{} deleted category {}", admin.id, category_id);
            Ok(Json(Success::ok()))
        }
        CategoryDeletion::NotFound => Err(ApiError::not_found("Category")),
        CategoryDeletion::InUse => {
            warn!("Refused to delete category {} with tutors", category_id);
            Err(ApiError::Conflict(
                "Cannot delete category with associated tutors".into(),
            ))
        }
    }
}
