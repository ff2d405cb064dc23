use crate::api::dto::{Success, SubscriptionDto, UserDto};
use crate::api::input::parse_rfc3339;
use crate::api::{AdminCaller, ApiError, AppState, ValidatedJson, ValidatedPath};
use crate::store::SubscriptionChanges;
use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub plan: Option<String>,
    #[validate(range(min = 0, message = "Credits cannot be negative"))]
    pub credits: Option<i64>,
    pub stripe_status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub plan: Option<String>,
    #[validate(range(min = 0, message = "Credits cannot be negative"))]
    pub credits: Option<i64>,
    pub stripe_status: Option<String>,
    pub stripe_current_period_end: Option<String>,
}

pub async fn list_users(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.store.list_subscriptions_with_profiles().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

pub async fn get_user(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(user_id): ValidatedPath<String>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let subscription = state
        .store
        .find_subscription_by_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(subscription.into()))
}

pub async fn update_user(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(user_id): ValidatedPath<String>,
    ValidatedJson(body): ValidatedJson<UserUpdate>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let changes = SubscriptionChanges {
        plan: body.plan,
        credits: body.credits,
        stripe_status: body.stripe_status,
        stripe_current_period_end_us: None,
    };
    let updated = state
        .store
        .update_subscription_by_user(&user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    info!("{} updated subscription of {}", admin.id, user_id);
    Ok(Json(updated.into()))
}

pub async fn delete_user(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(user_id): ValidatedPath<String>,
) -> Result<Json<Success>, ApiError> {
    if !state.store.delete_subscription_by_user(&user_id).await? {
        return Err(ApiError::not_found("User"));
    }
    info!("{} deleted subscription of {}", admin.id, user_id);
    Ok(Json(Success::ok()))
}

pub async fn list_subscriptions(
    _admin: AdminCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionDto>>, ApiError> {
    let subscriptions = state.store.list_subscriptions().await?;
    Ok(Json(
        subscriptions.into_iter().map(SubscriptionDto::from).collect(),
    ))
}

pub async fn get_subscription(
    _admin: AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let subscription = state
        .store
        .find_subscription(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscription"))?;
    Ok(Json(subscription.into()))
}

pub async fn update_subscription(
    AdminCaller(admin): AdminCaller,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<SubscriptionUpdate>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let period_end = match body.stripe_current_period_end.as_deref() {
        Some(text) => Some(parse_rfc3339(text).ok_or_else(|| {
            ApiError::Validation("stripeCurrentPeriodEnd must be an RFC 3339 timestamp".into())
        })?),
        None => None,
    };

    let changes = SubscriptionChanges {
        plan: body.plan,
        credits: body.credits,
        stripe_status: body.stripe_status,
        stripe_current_period_end_us: period_end,
    };
    let updated = state
        .store
        .update_subscription(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Subscription"))?;
    info!("{} updated subscription {}", admin.id, id);
    Ok(Json(updated.into()))
}
