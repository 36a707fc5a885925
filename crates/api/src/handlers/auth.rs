//! Handlers for the `/auth` resource.
//!
//! Tokens are stateless. Logging out bumps the account's token version,
//! which the [`AuthUser`] extractor checks on every request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use doclabel_core::error::CoreError;
use doclabel_core::types::DbId;
use doclabel_db::models::user::User;
use doclabel_db::repositories::{RoleRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive failed logins that trigger a lockout.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub role: String,
}

/// Answer to a username availability check.
#[derive(Debug, Serialize)]
pub struct UsernameCount {
    pub username: String,
    /// `0` when the name is free.
    pub count: i64,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is temporarily locked. Try again later.".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::increment_failed_login(&state.pool, user.id).await?;
        if failures >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, failures, "Account locked after failed logins");
        }
        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let response = issue_token(&state, &user).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/logout
///
/// Revokes every token issued to the caller, on all devices.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let version = UserRepo::bump_token_version(&state.pool, auth_user.user_id).await?;
    tracing::info!(
        user_id = auth_user.user_id,
        token_id = %auth_user.token_id,
        token_version = version,
        "User logged out"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/usernames/{username}/count
///
/// Public, so the sign-up form can check a name before submitting.
pub async fn username_count(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<DataResponse<UsernameCount>>> {
    let count = UserRepo::count_by_username(&state.pool, &username).await?;
    Ok(Json(DataResponse {
        data: UsernameCount { username, count },
    }))
}

async fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let jwt = &state.config.jwt;

    let access_token = jwt
        .issue(user.id, &role, user.token_version)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        expires_in: jwt.expires_in_secs(),
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
            role,
        },
    })
}
