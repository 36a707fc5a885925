//! Handlers for `/me`: the caller's own profile, password and history.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use doclabel_core::error::CoreError;
use doclabel_core::permissions::Action;
use doclabel_db::models::history::{HistoryEntry, RecordHistory, MAX_HISTORY_ENTRIES};
use doclabel_db::models::user::{UpdateProfile, User, UserResponse};
use doclabel_db::repositories::{DocumentRepo, HistoryRepo, UserRepo};
use serde::Deserialize;

use super::{ensure_document, validate_input};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `PUT /me/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// The current password.
    pub origin_password: String,
    pub password: String,
    /// Must repeat `password`.
    pub password2: String,
}

async fn load_self(state: &AppState, user: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))
}

/// GET /api/v1/me
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let account = load_self(&state, &user).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(account, user.role),
    }))
}

/// PUT /api/v1/me
///
/// A taken username or email is a 409 from the unique constraint.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_input(&input)?;
    let account = UserRepo::update_profile(&state.pool, user.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;
    tracing::info!(user_id = user.user_id, "Profile updated");
    Ok(Json(DataResponse {
        data: UserResponse::from_user(account, user.role),
    }))
}

/// PUT /api/v1/me/password
///
/// On success every token issued so far stops working, including the one
/// used for this request. The client logs in again.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let account = load_self(&state, &user).await?;

    let current_ok = verify_password(&input.origin_password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_ok {
        return Err(AppError::Core(CoreError::Validation(
            "Current password is incorrect".into(),
        )));
    }
    if input.password != input.password2 {
        return Err(AppError::Core(CoreError::Validation(
            "Passwords do not match".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::set_password(&state.pool, user.user_id, &password_hash).await?;

    tracing::info!(user_id = user.user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/me/history
///
/// Most recently touched documents first.
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<HistoryEntry>>>> {
    let entries = HistoryRepo::list_recent(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/me/history
pub async fn record_history(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<RecordHistory>,
) -> AppResult<StatusCode> {
    validate_input(&input)?;
    let project_id = DocumentRepo::find_by_id(&state.pool, input.document_id)
        .await?
        .map(|d| d.project_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Document",
            id: input.document_id,
        }))?;
    user.authorize(&state, Some(project_id), Action::Read)?;
    let document = ensure_document(&state.pool, project_id, input.document_id).await?;

    HistoryRepo::record(
        &state.pool,
        user.user_id,
        document.id,
        &input.operation,
        MAX_HISTORY_ENTRIES,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
