use crate::api::dto::{CourseworkCategoryDto, Success, TemplateDto};
use crate::api::input::{flexible_bool, form_fields, present, trimmed, trimmed_opt};
use crate::api::{AdminCaller, ApiError, AppState, ValidatedJson, ValidatedPath};
use crate::entity::coursework_templates;
use crate::store::{NewCourseworkCategory, NewTemplate, TemplateChanges, TemplateWrite};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

const SLUG_TAKEN: &str = "A template with this slug already exists";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseworkCategoryCreate {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreate {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Name, slug, and AI prompt are required"))]
    pub name: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Name, slug, and AI prompt are required"))]
    pub slug: String,
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Name, slug, and AI prompt are required"))]
    pub ai_prompt: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "form_fields")]
    pub form_fields: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Slug cannot be empty"))]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "AI prompt cannot be empty"))]
    pub ai_prompt: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "form_fields")]
    pub form_fields: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Blank optional text is stored as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn encode_form_fields(fields: Vec<Value>) -> Result<String, ApiError> {
    serde_json::to_string(&fields).map_err(|e| ApiError::Internal(e.into()))
}

fn saved(outcome: TemplateWrite) -> Result<coursework_templates::Model, ApiError> {
    match outcome {
        TemplateWrite::Saved(template) => Ok(template),
        TemplateWrite::NotFound => Err(ApiError::not_found("Template")),
        TemplateWrite::SlugTaken => Err(ApiError::Conflict(SLUG_TAKEN.into())),
    }
}

pub async fn list_coursework_categories(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseworkCategoryDto>>, ApiError> {
    let categories = state.store.list_coursework_categories().await?;
    Ok(Json(
        categories
            .into_iter()
            .map(CourseworkCategoryDto::from)
            .collect(),
    ))
}

pub async fn create_coursework_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CourseworkCategoryCreate>,
) -> Result<(StatusCode, Json<CourseworkCategoryDto>), ApiError> {
    let category = state
        .store
        .create_coursework_category(NewCourseworkCategory {
            name: body.name,
            description: non_blank(body.description),
            icon: non_blank(body.icon),
            sort_order: body.sort_order,
            is_active: body.is_active.unwrap_or(true),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

pub async fn list_templates(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<TemplateDto>>, ApiError> {
    let templates = state.store.list_templates().await?;
    Ok(Json(templates.into_iter().map(TemplateDto::from).collect()))
}

pub async fn create_template(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<TemplateCreate>,
) -> Result<(StatusCode, Json<TemplateDto>), ApiError> {
    let outcome = state
        .store
        .create_template(NewTemplate {
            name: body.name,
            slug: body.slug,
            ai_prompt: body.ai_prompt,
            description: non_blank(body.description),
            icon: non_blank(body.icon),
            category: non_blank(body.category),
            form_fields: encode_form_fields(body.form_fields.unwrap_or_default())?,
            is_active: body.is_active.unwrap_or(true),
            sort_order: body.sort_order,
            created_by: admin.id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(saved(outcome)?.into())))
}

pub async fn get_template(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(template_id): ValidatedPath<i64>,
) -> Result<Json<TemplateDto>, ApiError> {
    let template = state
        .store
        .find_template(template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template"))?;
    Ok(Json(template.into()))
}

pub async fn update_template(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(template_id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<TemplateUpdate>,
) -> Result<Json<TemplateDto>, ApiError> {
    let form_fields = match body.form_fields {
        Some(fields) => Some(encode_form_fields(fields)?),
        None => None,
    };
    let changes = TemplateChanges {
        name: body.name,
        slug: body.slug,
        ai_prompt: body.ai_prompt,
        description: body.description.map(non_blank),
        icon: body.icon.map(non_blank),
        category: body.category.map(non_blank),
        form_fields,
        is_active: body.is_active,
        sort_order: body.sort_order,
    };
    let outcome = state.store.update_template(template_id, changes).await?;
    Ok(Json(saved(outcome)?.into()))
}

pub async fn delete_template(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(template_id): ValidatedPath<i64>,
) -> Result<Json<Success>, ApiError> {
    if !state.store.delete_template(template_id).await? {
        return Err(ApiError::not_found("Template"));
    }
    Ok(Json(Success::ok()))
}
