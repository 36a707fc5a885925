//! Handlers for `/projects/{project_id}/labels`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use doclabel_core::permissions::Action;
use doclabel_core::types::DbId;
use doclabel_db::models::label::{CreateLabel, Label};
use doclabel_db::repositories::LabelRepo;

use super::{ensure_project, validate_input};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{project_id}/labels
///
/// A duplicate label text within the project is a 409.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    AppJson(input): AppJson<CreateLabel>,
) -> AppResult<(StatusCode, Json<DataResponse<Label>>)> {
    user.authorize(&state, Some(project_id), Action::ManageLabels)?;
    validate_input(&input)?;
    ensure_project(&state.pool, project_id).await?;

    let label = LabelRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(user_id = user.user_id, project_id, label_id = label.id, "Label created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: label })))
}

/// GET /api/v1/projects/{project_id}/labels
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Label>>>> {
    user.authorize(&state, Some(project_id), Action::Read)?;
    ensure_project(&state.pool, project_id).await?;
    let labels = LabelRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: labels }))
}
