use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use skills_core::CoreError;
use skills_types::api::{AiMatchRequest, MatchRequest, MatchResponse, MatchVerdict};

use crate::error::{ApiError, path_id};
use crate::state::AppState;

pub async fn ai_match(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AiMatchRequest>, ApiError>,
) -> Result<Json<MatchVerdict>, ApiError> {
    let skills = req.skills.map(|s| s.into_vec()).unwrap_or_default();
    let requirements = req.requirements.map(|r| r.into_vec()).unwrap_or_default();
    let verdict = state.matcher.score(&skills, &requirements).await?;
    Ok(Json(verdict))
}

/// Scores a stored user's skills against a stored task's requirements.
pub async fn match_user_to_task(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<MatchRequest>, ApiError>,
) -> Result<Json<MatchResponse>, ApiError> {
    let (Some(user_id), Some(task_id)) = (non_blank(req.user_id), non_blank(req.task_id)) else {
        return Err(CoreError::invalid("user_id and task_id are required").into());
    };
    let user_id: Uuid = path_id(&user_id, "User not found")?;
    let task_id: Uuid = path_id(&task_id, "Task not found")?;

    let response = state
        .matcher
        .match_user_to_task(&state.profiles, &state.tasks, user_id, task_id)
        .await?;
    Ok(Json(response))
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
