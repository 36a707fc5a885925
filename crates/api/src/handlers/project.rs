//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use doclabel_core::error::CoreError;
use doclabel_core::permissions::Action;
use doclabel_core::types::DbId;
use doclabel_db::models::project::{CreateProject, Project, UpdateProject, PROJECT_TYPES};
use doclabel_db::repositories::ProjectRepo;

use super::{ensure_project, validate_input};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    user.authorize(&state, None, Action::ManageProjects)?;
    validate_input(&input)?;
    if let Some(kind) = input.project_type.as_deref() {
        if !PROJECT_TYPES.contains(&kind) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown project type '{kind}'. Must be one of: {}",
                PROJECT_TYPES.join(", ")
            ))));
        }
    }

    let project = ProjectRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(user_id = user.user_id, project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    user.authorize(&state, None, Action::Read)?;
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    user.authorize(&state, Some(id), Action::Read)?;
    let project = ensure_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    user.authorize(&state, Some(id), Action::ManageProjects)?;
    validate_input(&input)?;
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.authorize(&state, Some(id), Action::ManageProjects)?;
    if ProjectRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(user_id = user.user_id, project_id = id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}
