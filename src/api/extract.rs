use super::{ApiError, AppState};
use crate::identity::Caller;
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        state
            .identity
            .resolve(&parts.headers)
            .ok_or(ApiError::Unauthorized)
    }
}

/// A caller present in the admin allow-list. Every `/api/admin` handler takes one.
pub struct AdminCaller(pub Caller);

impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let caller = Caller::from_request_parts(parts, state).await?;
        if !state.store.is_admin(&caller.id).await? {
            return Err(ApiError::Forbidden);
        }
        Ok(AdminCaller(caller))
    }
}

/// Path parameters whose rejection is reported as a JSON `Validation` error.
pub struct ValidatedPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid path: {}", e.body_text())))?;
        Ok(ValidatedPath(value))
    }
}

/// JSON body run through `validator::Validate`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate().map_err(|e| ApiError::Validation(first_message(&e)))?;
        Ok(ValidatedJson(value))
    }
}

/// The first field message, falling back to the full report.
fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}
