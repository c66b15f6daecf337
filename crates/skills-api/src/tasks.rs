use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use skills_types::api::{TaskListQuery, TaskRequest};
use skills_types::models::{Task, TaskChanges};

use crate::error::{ApiError, path_id};
use crate::state::AppState;

const TASK_NOT_FOUND: &str = "Task not found";

pub async fn create_task(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TaskRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let requirements = req.requirements.map(|r| r.into_vec()).unwrap_or_default();
    let task = state
        .tasks
        .create(req.title, req.description, requirements)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<TaskListQuery>, ApiError>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.tasks.list(query.limit, query.offset).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = path_id(&id, TASK_NOT_FOUND)?;
    Ok(Json(state.tasks.get(id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<TaskRequest>, ApiError>,
) -> Result<Json<Task>, ApiError> {
    let id = path_id(&id, TASK_NOT_FOUND)?;
    let changes = TaskChanges {
        title: req.title,
        description: req.description,
        requirements: req.requirements.map(|r| r.into_vec()),
    };
    Ok(Json(state.tasks.update(id, changes).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = path_id(&id, TASK_NOT_FOUND)?;
    state.tasks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
