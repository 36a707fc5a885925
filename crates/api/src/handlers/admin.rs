//! Handlers for `/admin/users`.
//!
//! Every handler requires [`Action::ManageUsers`], which only admins hold.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use doclabel_core::error::CoreError;
use doclabel_core::permissions::Action;
use doclabel_core::types::DbId;
use doclabel_db::models::user::{CreateUser, UserResponse};
use doclabel_db::repositories::{RoleRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use super::validate_input;
use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 20))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    /// Role name: `admin`, `project_owner` or `annotator`.
    pub role: String,
}

/// Body of `PUT /admin/users/{id}/password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    admin: AuthUser,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    admin.authorize(&state, None, Action::ManageUsers)?;
    validate_input(&input)?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = RoleRepo::find_by_name(&state.pool, &input.role)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown role '{}'",
                input.role
            )))
        })?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            role_id: role.id,
        },
    )
    .await?;
    tracing::info!(admin_id = admin.user_id, user_id = user.id, role = %role.name, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(user, role.name),
        }),
    ))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    admin: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    admin.authorize(&state, None, Action::ManageUsers)?;
    let users = UserRepo::list(&state.pool).await?;
    let roles: Vec<(DbId, String)> = RoleRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let data = users
        .into_iter()
        .map(|u| {
            let role = roles
                .iter()
                .find(|(id, _)| *id == u.role_id)
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/admin/users/{id}/password
///
/// Sets a new password without knowing the old one. The user's lockout is
/// cleared and their outstanding tokens are revoked.
pub async fn reset_password(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    admin.authorize(&state, None, Action::ManageUsers)?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    if !UserRepo::set_password(&state.pool, id, &password_hash).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    tracing::info!(admin_id = admin.user_id, user_id = id, "Password reset by admin");
    Ok(StatusCode::NO_CONTENT)
}
