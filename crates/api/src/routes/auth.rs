//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`. Only `logout` needs a token.
///
/// ```text
/// POST /login                        -> login
/// POST /logout                       -> logout
/// GET  /usernames/{username}/count   -> username_count
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/usernames/{username}/count", get(auth::username_count))
}
