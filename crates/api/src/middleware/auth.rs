//! Bearer-token extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use doclabel_core::error::CoreError;
use doclabel_core::permissions::{Action, Principal};
use doclabel_core::types::DbId;
use doclabel_db::repositories::{RoleRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The caller behind an `Authorization: Bearer` header.
///
/// Extraction verifies the token and then reloads the account: a
/// deactivated user, or a token issued before the user's last logout or
/// password change, is rejected with 401. `role` is read from the account,
/// not from the token, so a role change applies on the next request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
    /// Id of the presented token.
    pub token_id: String,
}

impl AuthUser {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role.clone(),
        }
    }

    /// Ask the configured permission gate whether this user may perform
    /// `action`, optionally on a specific project.
    pub fn authorize(
        &self,
        state: &AppState,
        project_id: Option<DbId>,
        action: Action,
    ) -> AppResult<()> {
        state
            .gate
            .check(&self.principal(), project_id, action)
            .map_err(AppError::Core)
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                unauthorized("Invalid Authorization format. Expected: Bearer <token>")
            })?;

        let claims = state
            .config
            .jwt
            .verify(token)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| unauthorized("Account is not active"))?;
        if user.token_version != claims.ver {
            return Err(unauthorized("Token has been revoked"));
        }

        let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
        Ok(AuthUser {
            user_id: user.id,
            role,
            token_id: claims.jti,
        })
    }
}
