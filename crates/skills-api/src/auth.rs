use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;

use skills_types::api::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = state
        .accounts
        .sign_up(
            req.email.as_deref(),
            req.password.as_deref(),
            req.full_name.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Signup successful".into(),
            user_id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let sign_in = state
        .accounts
        .log_in(req.email.as_deref(), req.password.as_deref())
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        user: sign_in.user,
        session: sign_in.session,
    }))
}
