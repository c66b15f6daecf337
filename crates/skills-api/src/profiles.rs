use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use skills_types::api::{ProfileEnvelope, ProfileUpdate, ProfileUpdated, UserIdList};
use skills_types::models::Principal;

use crate::error::{ApiError, path_id};
use crate::state::AppState;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserIdList>, ApiError> {
    let users = state.profiles.list_ids().await?;
    Ok(Json(UserIdList { users }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<ProfileEnvelope>, ApiError> {
    let id = path_id(&id, "User not found")?;
    let profile = state.profiles.get(&principal, id).await?;
    Ok(Json(ProfileEnvelope { profile }))
}

/// Only `name`, `email`, `skills`, `bio` and `location` are applied; other
/// keys in the body are ignored.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    WithRejection(Json(update), _): WithRejection<Json<ProfileUpdate>, ApiError>,
) -> Result<Json<ProfileUpdated>, ApiError> {
    let id = path_id(&id, "Profile not found")?;
    let profile = state.profiles.update(&principal, id, update).await?;
    Ok(Json(ProfileUpdated {
        message: "Profile updated successfully".into(),
        profile,
    }))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = path_id(&id, "Profile not found")?;
    state.profiles.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
